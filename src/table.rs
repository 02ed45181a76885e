//! Truth table enumeration and binary image packing

use kdam::{tqdm, BarExt};

use crate::expr::OutputFn;
use crate::remap::{ConfigError, PinRemapTable};

/// Exhaustive enumeration of the output word for every address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruthTable {
    /// Number of address bits enumerated
    pub num_inputs: usize,
    /// Number of declared outputs, which fixes the packed width
    pub num_outputs: usize,
    /// One (address, word) pair per address, in ascending order
    pub entries: Vec<(u64, u64)>,
}

/// Enumerate the truth table for the given output functions
///
/// Every address in `[0, 2^num_inputs)` is evaluated against every output,
/// in declaration order, and each output bit lands on its physical data
/// line. The configuration is checked up front: nothing is produced on a
/// bad remap table.
pub fn generate_truth_table(
    outputs: &[OutputFn],
    remap: &PinRemapTable,
) -> Result<TruthTable, ConfigError> {
    remap.validate()?;
    if outputs.is_empty() {
        return Err(ConfigError::NoOutputs);
    }
    if outputs.len() > u64::BITS as usize {
        return Err(ConfigError::TooManyOutputs {
            num_outputs: outputs.len(),
        });
    }
    let width_bits = 8 * ((outputs.len() + 7) / 8);
    for logical in 0..outputs.len() {
        let physical = remap.data_bit(logical);
        if physical >= width_bits {
            return Err(ConfigError::DataOutOfRange {
                logical,
                physical,
                width_bits,
            });
        }
    }

    let total = 1u64 << remap.num_inputs;
    let mut entries = Vec::with_capacity(total as usize);
    let mut progress = tqdm!(total = total as usize);
    progress.set_description("Addresses");
    for addr in 0..total {
        let mut word = 0u64;
        for (i, output) in outputs.iter().enumerate() {
            word |= (output.eval(addr) as u64) << remap.data_bit(i);
        }
        entries.push((addr, word));
        if (addr + 1) % 4096 == 0 {
            progress.update_to((addr + 1) as usize).unwrap();
        }
    }
    progress.update_to(total as usize).unwrap();
    Ok(TruthTable {
        num_inputs: remap.num_inputs,
        num_outputs: outputs.len(),
        entries,
    })
}

/// Pack a truth table into raw EPROM image bytes
///
/// `ceil(num_outputs / 8)` bytes per address, least significant byte
/// first, addresses in ascending order, no header or padding.
pub fn pack_image(table: &TruthTable) -> Vec<u8> {
    let bytes_per_word = (table.num_outputs + 7) / 8;
    let mut ret = Vec::with_capacity(bytes_per_word * table.entries.len());
    for (_, word) in &table.entries {
        ret.extend_from_slice(&word.to_le_bytes()[..bytes_per_word]);
    }
    ret
}

/// Enumerate and pack in one go
pub fn generate_image(outputs: &[OutputFn], remap: &PinRemapTable) -> Result<Vec<u8>, ConfigError> {
    Ok(pack_image(&generate_truth_table(outputs, remap)?))
}
