//! Prize fund reference.

use crate::models::{PrizeCategory, PrizeFundEntry, PrizeFundLine, PrizeFundSection};
use crate::snapshot::Snapshot;
use crate::storage::TableKind;

use super::{rejected_note, require_table, View};

const NO_FUND: &str = "The prize fund has not been set up.";

/// Group prizes by competition, in display order, with positions ascending.
/// Categories without prizes are left out.
pub fn prize_fund_sections(entries: &[PrizeFundEntry]) -> Vec<PrizeFundSection> {
    PrizeCategory::ALL
        .iter()
        .filter_map(|category| {
            let mut prizes: Vec<&PrizeFundEntry> =
                entries.iter().filter(|e| e.category == *category).collect();
            if prizes.is_empty() {
                return None;
            }
            prizes.sort_by_key(|e| e.position);

            Some(PrizeFundSection {
                category: *category,
                title: category.title().to_string(),
                total: prizes.iter().map(|e| e.amount).sum(),
                lines: prizes
                    .into_iter()
                    .map(|e| PrizeFundLine {
                        label: e.position_label(),
                        amount: e.amount,
                    })
                    .collect(),
            })
        })
        .collect()
}

pub fn prize_fund_view(snapshot: &Snapshot) -> View<Vec<PrizeFundSection>> {
    let table = match require_table(&snapshot.prize_fund, NO_FUND) {
        Ok(t) => t,
        Err(view) => return view,
    };
    let notes: Vec<String> = rejected_note(TableKind::PrizeFund, table)
        .into_iter()
        .collect();

    let sections = prize_fund_sections(&table.rows);
    if sections.is_empty() {
        return View::no_data(NO_FUND).with_notes(notes);
    }
    View::ready(sections).with_notes(notes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::ViewStatus;
    use crate::storage::LoadedTable;
    use pretty_assertions::assert_eq;

    fn entry(category: PrizeCategory, position: u32, amount: f64) -> PrizeFundEntry {
        PrizeFundEntry {
            category,
            position,
            amount,
        }
    }

    #[test]
    fn test_sections_in_display_order() {
        let entries = vec![
            entry(PrizeCategory::Cup, 2, 20.0),
            entry(PrizeCategory::Standard, 2, 60.0),
            entry(PrizeCategory::Weekly, 1, 10.0),
            entry(PrizeCategory::Standard, 1, 120.0),
            entry(PrizeCategory::Cup, 1, 50.0),
        ];
        let sections = prize_fund_sections(&entries);

        let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Main League", "Jager Cup", "Weekly Winner"]);

        let standard = &sections[0];
        assert_eq!(standard.total, 180.0);
        assert_eq!(
            standard.lines,
            vec![
                PrizeFundLine { label: Some("1st".into()), amount: 120.0 },
                PrizeFundLine { label: Some("2nd".into()), amount: 60.0 },
            ]
        );

        let cup_labels: Vec<_> = sections[1].lines.iter().map(|l| l.label.clone()).collect();
        assert_eq!(cup_labels, vec![Some("Winner".to_string()), Some("2nd".to_string())]);
        assert_eq!(sections[2].lines[0].label, None);
    }

    #[test]
    fn test_empty_fund() {
        assert!(prize_fund_sections(&[]).is_empty());

        let view = prize_fund_view(&Snapshot::empty());
        assert_eq!(view.status, ViewStatus::NoData);

        let mut snap = Snapshot::empty();
        snap.prize_fund = Ok(LoadedTable::new(vec![entry(PrizeCategory::H2h, 1, 40.0)]));
        let view = prize_fund_view(&snap);
        assert_eq!(view.status, ViewStatus::Ready);
        assert_eq!(view.data[0].title, "Head to Head League");
    }
}
