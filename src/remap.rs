//! Pin remapping between the logical device pins and a physical adapter

use std::fmt;

use fxhash::FxHashMap;

/// Address and data line remapping for an EPROM adapter
///
/// Both maps are partial: a logical index that is not present maps to
/// itself. `address_map` sends logical input bits to physical address
/// bits; `data_map` sends logical output indices to physical data lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinRemapTable {
    /// Number of logical inputs `A1..A<num_inputs>`
    pub num_inputs: usize,
    /// Logical input bit to physical address bit, 0-based
    pub address_map: FxHashMap<usize, usize>,
    /// Logical output index to physical data line, 0-based
    pub data_map: FxHashMap<usize, usize>,
}

/// Errors aborting generation before any table row is produced
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The number of inputs is zero
    NoInputs,
    /// The address space is too large to enumerate
    TooManyInputs {
        /// Declared number of inputs
        num_inputs: usize,
    },
    /// An address map entry beyond the address word
    AddressOutOfRange {
        /// Logical input bit of the entry
        logical: usize,
        /// Physical address bit of the entry
        physical: usize,
    },
    /// A data map entry beyond the packed image width
    DataOutOfRange {
        /// Logical output index of the entry
        logical: usize,
        /// Physical data line of the entry
        physical: usize,
        /// Packed width in bits
        width_bits: usize,
    },
    /// More outputs than fit one packed word
    TooManyOutputs {
        /// Declared number of outputs
        num_outputs: usize,
    },
    /// No output functions were declared
    NoOutputs,
    /// Malformed remap file line
    Parse {
        /// 1-based line number of the offending line
        line: usize,
        /// What went wrong
        message: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoInputs => write!(f, "the number of inputs must be at least 1"),
            ConfigError::TooManyInputs { num_inputs } => {
                write!(f, "{} inputs: address space too large to enumerate", num_inputs)
            }
            ConfigError::AddressOutOfRange { logical, physical } => write!(
                f,
                "address map entry {} -> {} beyond the address word",
                logical, physical
            ),
            ConfigError::DataOutOfRange {
                logical,
                physical,
                width_bits,
            } => write!(
                f,
                "data map entry {} -> {} beyond the {}-bit packed width",
                logical, physical, width_bits
            ),
            ConfigError::TooManyOutputs { num_outputs } => {
                write!(f, "{} outputs do not fit one packed word", num_outputs)
            }
            ConfigError::NoOutputs => write!(f, "no outputs declared"),
            ConfigError::Parse { line, message } => write!(f, "line {}: {}", line, message),
        }
    }
}

impl std::error::Error for ConfigError {}

impl PinRemapTable {
    /// The identity remapping: logical order is physical order
    pub fn identity(num_inputs: usize) -> Self {
        PinRemapTable {
            num_inputs,
            address_map: FxHashMap::default(),
            data_map: FxHashMap::default(),
        }
    }

    /// Remapping for the original device wired behind a 27C512 adapter
    pub fn eprom_27c512() -> Self {
        let address_map = [
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 4),
            (4, 5),
            (5, 6),
            (6, 7),
            (7, 12),
            (8, 14),
            (9, 13),
            (10, 8),
            (11, 9),
            (12, 11),
            (13, 15),
            (14, 10),
            (15, 0),
        ]
        .into_iter()
        .collect();
        let data_map = [(0, 6), (1, 5), (2, 4), (3, 3), (4, 2), (5, 1), (6, 0), (7, 7)]
            .into_iter()
            .collect();
        PinRemapTable {
            num_inputs: 15,
            address_map,
            data_map,
        }
    }

    /// Physical address bit for a logical input bit
    pub fn address_bit(&self, logical: usize) -> usize {
        *self.address_map.get(&logical).unwrap_or(&logical)
    }

    /// Physical data line for a logical output index
    pub fn data_bit(&self, logical: usize) -> usize {
        *self.data_map.get(&logical).unwrap_or(&logical)
    }

    /// Check the configuration before it is used for generation
    ///
    /// Address entries may target bits above `num_inputs`: the adapter can
    /// wire an input to a higher EPROM address pin, which then always
    /// reads 0 within the enumerated space. They must still fit the
    /// address word. Data entries are checked against the packed width by
    /// the generator, which knows the output count.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_inputs == 0 {
            return Err(ConfigError::NoInputs);
        }
        if self.num_inputs > 32 {
            return Err(ConfigError::TooManyInputs {
                num_inputs: self.num_inputs,
            });
        }
        for (&logical, &physical) in &self.address_map {
            if physical >= u64::BITS as usize {
                return Err(ConfigError::AddressOutOfRange { logical, physical });
            }
        }
        Ok(())
    }

    /// Parse a remap file
    ///
    /// Line-oriented: `inputs <n>`, `addr <logical> <physical>` and
    /// `data <logical> <physical>` directives, 0-based indices, `#`
    /// comments. Unknown keywords and duplicate entries are errors.
    pub fn parse(text: &str) -> Result<PinRemapTable, ConfigError> {
        let mut ret = PinRemapTable::default();
        for (line_no, raw) in text.lines().enumerate() {
            let line = line_no + 1;
            let content = raw.split('#').next().unwrap_or("").trim();
            if content.is_empty() {
                continue;
            }
            let mut tokens = content.split_whitespace();
            let keyword = tokens.next().unwrap();
            match keyword {
                "inputs" => {
                    ret.num_inputs = parse_index(tokens.next(), line)?;
                }
                "addr" => {
                    let logical = parse_index(tokens.next(), line)?;
                    let physical = parse_index(tokens.next(), line)?;
                    if ret.address_map.insert(logical, physical).is_some() {
                        return Err(ConfigError::Parse {
                            line,
                            message: format!("duplicate addr entry for {}", logical),
                        });
                    }
                }
                "data" => {
                    let logical = parse_index(tokens.next(), line)?;
                    let physical = parse_index(tokens.next(), line)?;
                    if ret.data_map.insert(logical, physical).is_some() {
                        return Err(ConfigError::Parse {
                            line,
                            message: format!("duplicate data entry for {}", logical),
                        });
                    }
                }
                _ => {
                    return Err(ConfigError::Parse {
                        line,
                        message: format!("unknown keyword {:?}", keyword),
                    });
                }
            }
            if let Some(extra) = tokens.next() {
                return Err(ConfigError::Parse {
                    line,
                    message: format!("trailing token {:?}", extra),
                });
            }
        }
        ret.validate()?;
        Ok(ret)
    }
}

fn parse_index(token: Option<&str>, line: usize) -> Result<usize, ConfigError> {
    let token = token.ok_or_else(|| ConfigError::Parse {
        line,
        message: "missing index".to_string(),
    })?;
    token.parse().map_err(|_| ConfigError::Parse {
        line,
        message: format!("invalid index {:?}", token),
    })
}
