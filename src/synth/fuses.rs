//! Sum-of-products extraction from a decoded fuse array

use super::{Synthesis, SynthError};
use crate::jed::JedFile;
use crate::sop::{assemble, Literal, OutputSpec, ProductTerm, TermRow};

/// Shape of a product-term row in the fuse array
///
/// A row holds one fuse pair per input literal followed by one inclusion
/// bit per output; the array ends with one inversion bit per output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    /// Number of literal pairs per row
    pub num_literals: usize,
    /// Number of outputs
    pub num_outputs: usize,
}

impl RowLayout {
    /// Width of one product-term row in fuses
    pub fn row_width(&self) -> usize {
        2 * self.num_literals + self.num_outputs
    }
}

impl Default for RowLayout {
    /// The reference PAL layout: 16 literal pairs and 8 outputs, 40 fuses
    /// per row
    fn default() -> Self {
        RowLayout {
            num_literals: 16,
            num_outputs: 8,
        }
    }
}

/// Reconstruct sum-of-products equations from a decoded fuse map
///
/// Within a row, each literal is a fuse pair `(a, na)`: `(0, 1)` is the
/// positive literal, `(1, 0)` the negated one, and a pair with equal bits
/// leaves the input out of the term. The trailing bits of the row select
/// the outputs the term feeds, 0 meaning included. The final bits of the
/// array invert whole outputs (active-low).
pub fn synthesize_from_fuses(jed: &JedFile, layout: &RowLayout) -> Result<Synthesis, SynthError> {
    let width = layout.row_width();
    let count = jed.fuses.len();
    if count < layout.num_outputs || (count - layout.num_outputs) % width != 0 {
        return Err(SynthError::FuseCount {
            fuse_count: count,
            layout: *layout,
        });
    }
    let nb_rows = (count - layout.num_outputs) / width;
    let mut warnings = Vec::new();
    let mut rows = Vec::new();
    for r in 0..nb_rows {
        let bits = &jed.fuses[r * width..(r + 1) * width];
        let mut literals = Vec::new();
        for i in 0..layout.num_literals {
            let (a, na) = (bits[2 * i], bits[2 * i + 1]);
            if !a && na {
                literals.push(Literal::positive(i));
            } else if a && !na {
                literals.push(Literal::negative(i));
            }
        }
        if literals.is_empty() {
            warnings.push(format!("product row {} has no literals and is dropped", r + 1));
        }
        let included = (0..layout.num_outputs)
            .map(|i| !bits[2 * layout.num_literals + i])
            .collect();
        rows.push(TermRow {
            term: ProductTerm { literals },
            included,
        });
    }
    let mask = &jed.fuses[nb_rows * width..];
    let outputs: Vec<OutputSpec> = (0..layout.num_outputs)
        .map(|i| OutputSpec {
            name: format!("Y{}", i + 1),
            inverted: mask[i],
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

    /// One 40-bit row encoding `A1 & !A2`, included in Y1 only, plus an
    /// all-zero inversion mask. The A3 pair is (1,1): absent, like the
    /// untouched (0,0) pairs after it.
    fn reference_fuses() -> Vec<bool> {
        let mut text = String::new();
        text.push_str("011011");
        text.push_str(&"0".repeat(26));
        text.push_str("01111111");
        text.push_str("00000000");
        text.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn test_literal_pairs() {
        // (0,1) positive, (1,0) negative, equal pairs absent
        let jed = JedFile {
            fuse_count: 48,
            fuses: reference_fuses(),
            ..JedFile::default()
        };
        let synthesis = synthesize_from_fuses(&jed, &RowLayout::default()).unwrap();
        let eq = &synthesis.equations[0];
        assert_eq!(eq.name, "Y1");
        assert_eq!(eq.terms.len(), 1);
        assert_eq!(eq.terms[0].to_string(), "A1 & !A2");
        assert!(!eq.inverted);
        for eq in &synthesis.equations[1..] {
            assert!(eq.terms.is_empty());
        }
        // Seven constant-0 outputs are diagnosed
        assert_eq!(synthesis.warnings.len(), 7);
    }

    #[test]
    fn test_inversion_mask() {
        let mut fuses = reference_fuses();
        fuses[40] = true;
        let jed = JedFile {
            fuse_count: 48,
            fuses,
            ..JedFile::default()
        };
        let synthesis = synthesize_from_fuses(&jed, &RowLayout::default()).unwrap();
        assert!(synthesis.equations[0].inverted);
        assert!(!synthesis.equations[1].inverted);
    }

    #[test]
    fn test_empty_row_dropped() {
        // All pairs equal: the row has no literals and feeds nothing,
        // even though its all-zero inclusion bits select every output
        let jed = JedFile {
            fuse_count: 48,
            fuses: vec![false; 48],
            ..JedFile::default()
        };
        let synthesis = synthesize_from_fuses(&jed, &RowLayout::default()).unwrap();
        for eq in &synthesis.equations {
            assert!(eq.terms.is_empty());
        }
        assert!(synthesis
            .warnings
            .iter()
            .any(|w| w.contains("no literals")));
    }

    #[test]
    fn test_decode_then_synthesize() {
        // The QF48 scenario straight from the text format
        let bits: String = ["0110", &"0".repeat(28), "01111111", "00000000"].concat();
        let text = format!("ST RT2*\nQF48*\nF0*\nL0*\n{}\n", bits);
        let jed = JedFile::parse(&text).unwrap();
        assert_eq!(jed.part_number.as_deref(), Some("RT2"));
        let synthesis = synthesize_from_fuses(&jed, &RowLayout::default()).unwrap();
        assert_eq!(synthesis.equations[0].to_string(), "Y1 =\n  (A1 & !A2);");
        assert_eq!(synthesis.equations[1].to_string(), "Y2 = 0;");
    }

    #[test]
    fn test_bad_fuse_count() {
        let jed = JedFile {
            fuse_count: 47,
            fuses: vec![false; 47],
            ..JedFile::default()
        };
        let err = synthesize_from_fuses(&jed, &RowLayout::default()).unwrap_err();
        assert!(matches!(err, SynthError::FuseCount { fuse_count: 47, .. }));
        // An empty array (missing QF directive) is reported the same way
        let err = synthesize_from_fuses(&JedFile::default(), &RowLayout::default()).unwrap_err();
        assert!(matches!(err, SynthError::FuseCount { fuse_count: 0, .. }));
    }

    #[test]
    fn test_row_order_preserved() {
        // Two rows feeding Y1: the equation lists them in row order
        let mut fuses = Vec::new();
        let mut row1 = vec![false; 40];
        row1[1] = true; // A1
        for i in 33..40 {
            row1[i] = true;
        }
        let mut row2 = vec![false; 40];
        row2[2] = true; // !A2
        for i in 33..40 {
            row2[i] = true;
        }
        fuses.extend_from_slice(&row1);
        fuses.extend_from_slice(&row2);
        fuses.extend_from_slice(&[false; 8]);
        let jed = JedFile {
            fuse_count: 88,
            fuses,
            ..JedFile::default()
        };
        let synthesis = synthesize_from_fuses(&jed, &RowLayout::default()).unwrap();
        let eq = &synthesis.equations[0];
        assert_eq!(eq.terms.len(), 2);
        assert_eq!(eq.terms[0].to_string(), "A1");
        assert_eq!(eq.terms[1].to_string(), "!A2");
    }
}
