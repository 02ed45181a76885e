//! Sum-of-products extraction from a textual don't-care matrix

use super::{Synthesis, SynthError};
use crate::sop::{assemble, Literal, OutputSpec, ProductTerm, TermRow};

struct InputRow {
    line: usize,
    index: usize,
    pattern: Vec<char>,
}

struct OutputRow {
    line: usize,
    name: String,
    inverted: bool,
    pattern: Vec<char>,
}

fn is_input_label(label: &str) -> bool {
    label
        .strip_prefix('A')
        .map_or(false, |d| !d.is_empty() && d.chars().all(|c| c.is_ascii_digit()))
}

fn parse_output_label(label: &str) -> Option<(String, bool)> {
    let (name, inverted) = match label.strip_prefix('^') {
        Some(stripped) => (stripped, true),
        None => (label, false),
    };
    let digits = name.strip_prefix('Y')?;
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        Some((name.to_string(), inverted))
    } else {
        None
    }
}

/// Reconstruct sum-of-products equations from a don't-care matrix
///
/// Rows are pipe-delimited. A row labelled `A<k>` gives one pattern
/// character per term column: `1` puts the positive literal in the term,
/// `0` the negated one, `.` and `*` leave the input out. A row labelled
/// `Y<k>` (or `^Y<k>` for an active-low output) marks with `A` the
/// columns whose terms feed that output. Rows with any other label, such
/// as table separators, are skipped.
pub fn synthesize_from_matrix(text: &str) -> Result<Synthesis, SynthError> {
    let mut input_rows: Vec<InputRow> = Vec::new();
    let mut output_rows: Vec<OutputRow> = Vec::new();
    for (line_no, raw) in text.lines().enumerate() {
        let line = raw.trim();
        let Some(rest) = line.strip_prefix('|') else {
            continue;
        };
        let Some((label, data)) = rest.split_once('|') else {
            continue;
        };
        let Some(end) = data.rfind('|') else {
            continue;
        };
        let data = &data[..end];
        let label = label.trim();
        if is_input_label(label) {
            let index: usize = match label[1..].parse::<usize>() {
                Ok(k) if k > 0 => k - 1,
                _ => {
                    return Err(SynthError::BadLabel {
                        line: line_no + 1,
                        label: label.to_string(),
                    })
                }
            };
            let pattern = data
                .chars()
                .filter(|c| matches!(c, '0' | '1' | '.' | '*'))
                .collect();
            input_rows.push(InputRow {
                line: line_no + 1,
                index,
                pattern,
            });
        } else if let Some((name, inverted)) = parse_output_label(label) {
            let pattern = data.chars().filter(|c| matches!(c, 'A' | '-')).collect();
            output_rows.push(OutputRow {
                line: line_no + 1,
                name,
                inverted,
                pattern,
            });
        }
    }
    if input_rows.is_empty() {
        return Err(SynthError::NoInputRows);
    }
    let nb_cols = input_rows[0].pattern.len();
    for row in &input_rows {
        if row.pattern.len() != nb_cols {
            return Err(SynthError::PatternLength {
                line: row.line,
                expected: nb_cols,
                found: row.pattern.len(),
            });
        }
    }
    for row in &output_rows {
        if row.pattern.len() != nb_cols {
            return Err(SynthError::PatternLength {
                line: row.line,
                expected: nb_cols,
                found: row.pattern.len(),
            });
        }
    }

    let mut warnings = Vec::new();
    let mut rows = Vec::new();
    for c in 0..nb_cols {
        let mut literals = Vec::new();
        for row in &input_rows {
            match row.pattern[c] {
                '1' => literals.push(Literal::positive(row.index)),
                '0' => literals.push(Literal::negative(row.index)),
                _ => (),
            }
        }
        if literals.is_empty() {
            warnings.push(format!("term {} is empty (no variables used)", c + 1));
        }
        let included = output_rows.iter().map(|row| row.pattern[c] == 'A').collect();
        rows.push(TermRow {
            term: ProductTerm { literals },
            included,
        });
    }
    let outputs: Vec<OutputSpec> = output_rows
        .iter()
        .map(|row| OutputSpec {
            name: row.name.clone(),
            inverted: row.inverted,
        })
        .collect();
    let equations = assemble(&outputs, &rows, &mut warnings);
    Ok(Synthesis {
        equations,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_matrix() {
        let text = "| term | 1 | 2 | 3 |
|------|---|---|---|
| A1   | 1 | 0 | . |
| A2   | 0 | . | 1 |
| Y1   | A | - | A |
| ^Y2  | - | A | - |
";
        let synthesis = synthesize_from_matrix(text).unwrap();
        assert_eq!(synthesis.equations.len(), 2);
        let y1 = &synthesis.equations[0];
        assert_eq!(y1.name, "Y1");
        assert!(!y1.inverted);
        assert_eq!(y1.to_string(), "Y1 =\n  (A1 & !A2)\n  + (A2);");
        let y2 = &synthesis.equations[1];
        assert_eq!(y2.name, "Y2");
        assert!(y2.inverted);
        assert_eq!(y2.to_string(), "Y2 = !(\n  (!A1)\n);");
        assert!(synthesis.warnings.is_empty());
    }

    #[test]
    fn test_empty_term() {
        // Column 2 uses no variables: diagnosed, and never included even
        // though Y1 marks it
        let text = "| A1 | 1 | . |
| Y1 | A | A |
";
        let synthesis = synthesize_from_matrix(text).unwrap();
        assert_eq!(synthesis.equations[0].terms.len(), 1);
        assert!(synthesis
            .warnings
            .iter()
            .any(|w| w.contains("term 2 is empty")));
    }

    #[test]
    fn test_star_is_dont_care() {
        let text = "| A1 | * |
| A2 | 1 |
| Y1 | A |
";
        let synthesis = synthesize_from_matrix(text).unwrap();
        assert_eq!(synthesis.equations[0].terms[0].to_string(), "A2");
    }

    #[test]
    fn test_no_input_rows() {
        let err = synthesize_from_matrix("| Y1 | A |\n").unwrap_err();
        assert!(matches!(err, SynthError::NoInputRows));
    }

    #[test]
    fn test_pattern_length_mismatch() {
        let text = "| A1 | 1 | 0 |
| A2 | 1 |
";
        let err = synthesize_from_matrix(text).unwrap_err();
        assert!(matches!(
            err,
            SynthError::PatternLength {
                line: 2,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn test_zero_input_label() {
        let err = synthesize_from_matrix("| A0 | 1 |\n").unwrap_err();
        assert!(matches!(err, SynthError::BadLabel { line: 1, .. }));
    }

    #[test]
    fn test_constant_output() {
        let text = "| A1 | 1 |
| Y1 | - |
";
        let synthesis = synthesize_from_matrix(text).unwrap();
        assert!(synthesis.equations[0].terms.is_empty());
        assert_eq!(synthesis.equations[0].to_string(), "Y1 = 0;");
        assert!(synthesis.warnings.iter().any(|w| w.contains("constant 0")));
    }
}
