//! PLD fuse map, equation and EPROM image conversion tools
//!
//! This crate converts between three representations of the combinational
//! logic programmed into a PLD: the fuse map burned into the device,
//! Boolean sum-of-products equations, and a binary lookup table for an
//! EPROM that replaces the device behind an adapter with a different
//! pinout.
//!
//! ```bash
//! # Show available commands
//! palrom help
//! # Recover the equations from a fuse map
//! palrom decode device.jed -o device.eqn
//! # Build an EPROM image wired through the 27C512 adapter
//! palrom build device.eqn --preset eprom27c512 -o firmware.bin
//! # Check two equation files against each other
//! palrom equiv device.eqn rewritten.eqn --num-inputs 15
//! ```
//!
//! # Pipeline
//!
//! The pipeline has two independent stages that meet at plain equation
//! text. The synthesis stage recovers equations either from a fuse map
//! ([`jed`]) or from a textual don't-care matrix, both reducing their
//! source to the same rows of product terms and assembling them in
//! [`sop`] ([`synth`] holds the two front-ends). The generation stage
//! compiles equation text into expression trees ([`expr`]), remaps
//! logical pins to the adapter's physical pins ([`remap`]) and enumerates
//! the full truth table into a packed image ([`table`]).
//!
//! Equations look like `Y1 = (A1 & !A2) + (A3);`, and every file the
//! synthesis stage emits can be fed back to the generation stage.
//! Equation sets can also be compared against each other over the whole
//! address space ([`equiv`]).

#![warn(missing_docs)]

pub mod cmd;
pub mod equiv;
pub mod expr;
pub mod jed;
pub mod remap;
pub mod sop;
pub mod synth;
pub mod table;

pub use expr::{compile_equations, Expr, OutputFn};
pub use jed::JedFile;
pub use remap::PinRemapTable;
pub use sop::{Equation, Literal, ProductTerm};
pub use synth::{synthesize_from_fuses, synthesize_from_matrix, RowLayout, Synthesis};
pub use table::{generate_image, generate_truth_table, pack_image, TruthTable};
