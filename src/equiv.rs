//! Equivalence checking between compiled output function sets

use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::expr::OutputFn;

/// Counterexample to an equivalence check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    /// Address where the two sets disagree
    pub address: u64,
    /// Index of the disagreeing output
    pub output: usize,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "output {} differs at address {:#x}", self.output, self.address)
    }
}

fn address_mask(num_inputs: usize) -> u64 {
    if num_inputs >= u64::BITS as usize {
        !0
    } else {
        (1u64 << num_inputs) - 1
    }
}

fn compare_at(a: &[OutputFn], b: &[OutputFn], address: u64) -> Result<(), Mismatch> {
    for (output, (fa, fb)) in a.iter().zip(b).enumerate() {
        if fa.eval(address) != fb.eval(address) {
            return Err(Mismatch { address, output });
        }
    }
    Ok(())
}

/// Check two output sets over the whole address space
///
/// Outputs are compared by position, so both sets must declare the same
/// number of outputs. Returns the first counterexample found.
pub fn check_equivalence(a: &[OutputFn], b: &[OutputFn], num_inputs: usize) -> Result<(), Mismatch> {
    assert_eq!(a.len(), b.len());
    for address in 0..=address_mask(num_inputs) {
        compare_at(a, b, address)?;
    }
    Ok(())
}

/// Check two output sets on random addresses
///
/// For input spaces too wide to enumerate; agreement on the sampled
/// addresses is not a proof of equivalence.
pub fn check_equivalence_random(
    a: &[OutputFn],
    b: &[OutputFn],
    num_inputs: usize,
    nb_patterns: usize,
    seed: u64,
) -> Result<(), Mismatch> {
    assert_eq!(a.len(), b.len());
    let mut rng = SmallRng::seed_from_u64(seed);
    let mask = address_mask(num_inputs);
    for _ in 0..nb_patterns {
        compare_at(a, b, rng.gen::<u64>() & mask)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;
    use crate::expr::compile_equations;
    use crate::jed::JedFile;
    use crate::remap::PinRemapTable;
    use crate::sop::Literal;
    use crate::synth::{synthesize_from_fuses, RowLayout};

    #[test]
    fn test_equivalent() {
        let remap = PinRemapTable::identity(3);
        let a = compile_equations("Y1 = A1 & (A2 | A3);", &remap).unwrap();
        let b = compile_equations("Y1 = (A1 & A2) + (A1 & A3);", &remap).unwrap();
        assert_eq!(check_equivalence(&a, &b, 3), Ok(()));
        assert_eq!(check_equivalence_random(&a, &b, 3, 64, 1), Ok(()));
    }

    #[test]
    fn test_mismatch() {
        let remap = PinRemapTable::identity(2);
        let a = compile_equations("Y1 = A1; Y2 = A2;", &remap).unwrap();
        let b = compile_equations("Y1 = A1; Y2 = !A2;", &remap).unwrap();
        let mismatch = check_equivalence(&a, &b, 2).unwrap_err();
        assert_eq!(mismatch.output, 1);
        let mismatch = check_equivalence_random(&a, &b, 2, 64, 1).unwrap_err();
        assert_eq!(mismatch.output, 1);
    }

    /// Write one product term into a fuse row
    fn encode_row(fuses: &mut [bool], row: usize, literals: &[Literal], outputs: &[usize]) {
        let bits = &mut fuses[row * 40..(row + 1) * 40];
        // Exclude every output by default
        for bit in bits[32..40].iter_mut() {
            *bit = true;
        }
        for literal in literals {
            if literal.negated {
                bits[2 * literal.index] = true;
            } else {
                bits[2 * literal.index + 1] = true;
            }
        }
        for &output in outputs {
            bits[32 + output] = false;
        }
    }

    #[test]
    fn test_fuse_roundtrip() {
        // Encode a known equation set as fuses, emit and re-decode the
        // fuse map, synthesize equations back, and check the compiled
        // functions agree with the originals everywhere
        let text = "Y1 = (A1 & !A2) + (A3 & A2);
Y2 = !(
  (A1)
);
Y3 = 0;
";
        let mut fuses = vec![false; 3 * 40 + 8];
        encode_row(
            &mut fuses,
            0,
            &[Literal::positive(0), Literal::negative(1)],
            &[0],
        );
        encode_row(
            &mut fuses,
            1,
            &[Literal::positive(2), Literal::positive(1)],
            &[0],
        );
        encode_row(&mut fuses, 2, &[Literal::positive(0)], &[1]);
        // Inversion mask: Y2 is active-low
        fuses[3 * 40 + 1] = true;

        let emitted = JedFile {
            fuse_count: 128,
            fuses,
            ..JedFile::default()
        }
        .emit();
        let decoded = JedFile::parse(&emitted).unwrap();
        let synthesis = synthesize_from_fuses(&decoded, &RowLayout::default()).unwrap();
        let recovered = synthesis.equations.iter().take(3).join("\n");

        let remap = PinRemapTable::identity(3);
        let original = compile_equations(text, &remap).unwrap();
        let resynthesized = compile_equations(&recovered, &remap).unwrap();
        assert_eq!(check_equivalence(&original, &resynthesized, 3), Ok(()));
    }
}
