//! Human-readable ASCII solver formatting.

use std::fmt::Write as _;

use truss_expr::{near_zero, LinearExpr};

use crate::solver::Solver;

const PREVIEW_ROWS: usize = 20;
const PREVIEW_TERMS: usize = 30;

/// Formatting controls for pretty-print output.
#[derive(Debug, Clone, Copy)]
pub struct PrettyPrintOptions {
    /// Maximum number of tableau rows to render.
    pub rows: Option<usize>,
    /// Maximum number of terms to render per expression.
    pub terms: Option<usize>,
}

impl PrettyPrintOptions {
    /// Preview mode used by terse displays.
    pub fn preview() -> Self {
        Self {
            rows: Some(PREVIEW_ROWS),
            terms: Some(PREVIEW_TERMS),
        }
    }

    /// Full mode with no truncation.
    pub fn full() -> Self {
        Self {
            rows: None,
            terms: None,
        }
    }
}

impl Solver {
    /// Render the solver state to ASCII: objective row, tableau rows,
    /// infeasible set, and bookkeeping counts.
    pub fn format_ascii(&self, options: PrettyPrintOptions) -> String {
        let mut lines = Vec::new();
        let objective = self.objective();

        let z_row = self.tableau().row(&objective);
        match z_row {
            Some(row) => lines.push(format!(
                "Objective: {}",
                format_linear_expression(row, options.terms)
            )),
            None => lines.push("Objective: (missing)".to_string()),
        }

        let total_rows = self
            .tableau()
            .rows()
            .filter(|(basic, _)| **basic != objective)
            .count();
        let row_limit = options.rows.unwrap_or(total_rows).min(total_rows);
        lines.push(format!("Rows ({total_rows}):"));
        if row_limit == 0 {
            lines.push(" (none)".to_string());
        }
        for (basic, expr) in self
            .tableau()
            .rows()
            .filter(|(basic, _)| **basic != objective)
            .take(row_limit)
        {
            lines.push(format!(
                " {} = {}",
                basic.name(),
                format_linear_expression(expr, options.terms)
            ));
        }
        if row_limit < total_rows {
            lines.push(format!(" ... ({} more rows)", total_rows - row_limit));
        }

        let infeasible = self.tableau().infeasible_rows();
        if !infeasible.is_empty() {
            let names: Vec<&str> = infeasible.iter().map(|v| v.name()).collect();
            lines.push(format!("Infeasible: {}", names.join(", ")));
        }

        lines.push(format!(
            "Constraints: {}  Edit variables: {}  Columns: {}",
            self.num_constraints(),
            self.num_edit_vars(),
            self.tableau().num_columns(),
        ));

        lines.join("\n")
    }
}

fn format_linear_expression(expr: &LinearExpr, max_terms: Option<usize>) -> String {
    let mut rendered = String::new();
    let constant = expr.constant();
    let mut wrote = false;
    if !near_zero(constant) || expr.is_constant() {
        rendered.push_str(&format_ascii_number(constant));
        wrote = true;
    }

    let total = expr.num_terms();
    let term_limit = max_terms.unwrap_or(total).min(total);
    for (v, coeff) in expr.terms().iter().take(term_limit) {
        let negative = *coeff < 0.0;
        let magnitude = coeff.abs();
        let body = if near_zero(magnitude - 1.0) {
            v.name().to_string()
        } else {
            format!("{} {}", format_ascii_number(magnitude), v.name())
        };
        if wrote {
            let _ = write!(rendered, " {} {}", if negative { "-" } else { "+" }, body);
        } else {
            if negative {
                rendered.push('-');
            }
            rendered.push_str(&body);
            wrote = true;
        }
    }
    if term_limit < total {
        let _ = write!(rendered, " + ... ({} more terms)", total - term_limit);
    }
    rendered
}

/// Compact numeric rendering for pretty-print output: pivot noise is
/// rounded away and whole numbers print without a fractional part.
pub fn format_ascii_number(value: f64) -> String {
    // Also catches -0.0, which compares equal to zero.
    if value == 0.0 {
        return "0".to_string();
    }
    let rounded = (value * 1e9).round() / 1e9;
    if rounded == rounded.trunc() && rounded.abs() < 1e15 {
        format!("{}", rounded as i64)
    } else {
        // f64 Display picks the shortest form; non-finite values
        // (which the tableau should never carry) render as-is.
        format!("{rounded}")
    }
}

#[cfg(test)]
mod tests {
    use super::{format_ascii_number, PrettyPrintOptions};
    use crate::solver::Solver;
    use truss_expr::Variable;

    #[test]
    fn format_ascii_number_trims_zeros() {
        assert_eq!(format_ascii_number(10.0), "10");
        assert_eq!(format_ascii_number(-0.25), "-0.25");
        assert_eq!(format_ascii_number(0.0), "0");
        assert_eq!(format_ascii_number(-0.0), "0");
        assert_eq!(format_ascii_number(0.1 + 0.2), "0.3");
        assert_eq!(format_ascii_number(f64::INFINITY), "inf");
        assert_eq!(format_ascii_number(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn format_ascii_shows_rows_and_counts() {
        let mut solver = Solver::new();
        let x = Variable::new("x");
        solver.add_constraint(&x.eq_scalar(10.0)).expect("add");

        let rendered = solver.format_ascii(PrettyPrintOptions::full());
        assert!(rendered.starts_with("Objective:"));
        assert!(rendered.contains("x = 10"));
        assert!(rendered.contains("Constraints: 1"));
    }

    #[test]
    fn format_ascii_preview_truncates_rows() {
        let mut solver = Solver::new();
        for i in 0..25 {
            let v = Variable::new(format!("v{i}"));
            solver.add_constraint(&v.eq_scalar(i as f64)).expect("add");
        }
        let rendered = solver.format_ascii(PrettyPrintOptions::preview());
        assert!(rendered.contains("... (5 more rows)"));
    }
}
