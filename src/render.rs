use std::fmt::Write;

use crate::game::State;
use crate::sparse::SparsePolicy;
use crate::table::PolicyTable;

/// Customize table rendering for CLI output.
#[derive(Clone, Copy, Debug)]
pub struct RenderOptions {
    pub precision: usize,
    pub show_illegal: bool,
    pub show_features: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            precision: 3,
            show_illegal: false,
            show_features: false,
        }
    }
}

pub fn render_table<S: State>(table: &PolicyTable<S>) -> String {
    render_table_with_options(table, RenderOptions::default())
}

pub fn render_table_with_options<S: State>(
    table: &PolicyTable<S>,
    options: RenderOptions,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Policy table: {} rows x {} actions",
        table.num_rows(),
        table.num_actions()
    );
    for &player in table.players() {
        let rows = table.player_rows(player);
        let _ = writeln!(out, "Player {player} ({} rows):", rows.len());
        for index in rows {
            let key = &table.keys()[index];
            let row = table.row_at(index).unwrap_or(&[]);
            let mask = table.legal_mask(index).unwrap_or(&[]);
            let entries = row
                .iter()
                .zip(mask)
                .enumerate()
                .filter_map(|(action, (probability, legal))| {
                    if *legal {
                        Some(format!("{action}:{probability:.prec$}", prec = options.precision))
                    } else if options.show_illegal {
                        Some(format!("{action}:--"))
                    } else {
                        None
                    }
                })
                .collect::<Vec<_>>()
                .join("  ");
            let _ = writeln!(out, "  [{index}] {key:?}  {entries}");
            if options.show_features {
                if let Some(features) = table.features(index) {
                    let _ = writeln!(out, "      features {features:?}");
                }
            }
        }
    }
    out
}

pub fn describe_sparse(sparse: &SparsePolicy) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Sparse policy: {} keys", sparse.len());
    for (key, probabilities) in sparse.iter() {
        let pairs = probabilities
            .iter()
            .map(|(action, probability)| format!("{action}:{probability}"))
            .collect::<Vec<_>>()
            .join("  ");
        let _ = writeln!(out, "  {key:?}  {pairs}");
    }
    out
}
