//! Command line interface

use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::exit;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::equiv::{check_equivalence, check_equivalence_random};
use crate::expr::{compile_equations, OutputFn};
use crate::jed::JedFile;
use crate::remap::PinRemapTable;
use crate::sop::Equation;
use crate::synth::{synthesize_from_fuses, synthesize_from_matrix, RowLayout, Synthesis};
use crate::table::generate_image;

/// Command line arguments
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Command line arguments
#[derive(Subcommand)]
pub enum Commands {
    /// Convert a fuse map to Boolean equations
    ///
    /// Decodes the fuse array and reconstructs one sum-of-products
    /// equation per output from its product-term rows.
    #[clap(alias = "jed2eqn")]
    Decode(DecodeArgs),

    /// Convert a don't-care matrix to Boolean equations
    ///
    /// Reads a pipe-delimited table with one row per input and output,
    /// one column per product term.
    #[clap(alias = "tab2eqn")]
    Table(TableArgs),

    /// Build an EPROM image from Boolean equations
    ///
    /// Compiles the equations, enumerates the whole address space and
    /// packs the output bits into a raw binary image, remapped to the
    /// adapter's physical pins.
    #[clap(alias = "eqn2bin")]
    Build(BuildArgs),

    /// Show metadata of a fuse map
    #[clap()]
    Show(ShowArgs),

    /// Check equivalence between two equation files
    ///
    /// The command will fail if the two equation sets are not equivalent,
    /// and will output the failing address.
    #[clap(alias = "equiv")]
    CheckEquivalence(EquivArgs),
}

/// Remap presets for common adapters
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum Preset {
    /// No remapping: logical order is physical order
    #[default]
    Identity,
    /// Original device behind a 27C512 EPROM adapter
    Eprom27c512,
}

/// Command arguments for fuse map decoding
#[derive(Args)]
pub struct DecodeArgs {
    /// Fuse map to decode
    jed: PathBuf,

    /// Output file for the equations; stdout if not given
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

impl DecodeArgs {
    /// Run fuse map decoding
    pub fn run(&self) {
        let jed = read_fusemap(&self.jed);
        if let Some(part) = &jed.part_number {
            eprintln!("Part: {}", part);
        }
        let synthesis = match synthesize_from_fuses(&jed, &RowLayout::default()) {
            Ok(synthesis) => synthesis,
            Err(err) => {
                eprintln!("Error in {}: {}", self.jed.display(), err);
                exit(1);
            }
        };
        report_warnings(&synthesis);
        write_equations(self.output.as_deref(), &synthesis.equations);
    }
}

/// Command arguments for matrix conversion
#[derive(Args)]
pub struct TableArgs {
    /// Don't-care matrix to convert
    matrix: PathBuf,

    /// Output file for the equations; stdout if not given
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

impl TableArgs {
    /// Run matrix conversion
    pub fn run(&self) {
        let text = read_text(&self.matrix);
        let synthesis = match synthesize_from_matrix(&text) {
            Ok(synthesis) => synthesis,
            Err(err) => {
                eprintln!("Error in {}: {}", self.matrix.display(), err);
                exit(1);
            }
        };
        report_warnings(&synthesis);
        write_equations(self.output.as_deref(), &synthesis.equations);
    }
}

/// Command arguments for image generation
#[derive(Args)]
pub struct BuildArgs {
    /// Equation file to compile
    eqn: PathBuf,

    /// Remap file describing the adapter wiring
    #[arg(long)]
    map: Option<PathBuf>,

    /// Remap preset used when no map file is given
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    /// Number of inputs for the identity preset
    #[arg(long, default_value_t = 15)]
    num_inputs: usize,

    /// Output file for the binary image
    #[arg(short = 'o', long, default_value = "firmware.bin")]
    output: PathBuf,
}

impl BuildArgs {
    /// Run image generation
    pub fn run(&self) {
        let remap = if let Some(path) = &self.map {
            match PinRemapTable::parse(&read_text(path)) {
                Ok(remap) => remap,
                Err(err) => {
                    eprintln!("Error in {}: {}", path.display(), err);
                    exit(1);
                }
            }
        } else {
            match self.preset.unwrap_or_default() {
                Preset::Identity => PinRemapTable::identity(self.num_inputs),
                Preset::Eprom27c512 => PinRemapTable::eprom_27c512(),
            }
        };
        let outputs = compile_outputs(&self.eqn, &remap);
        let image = match generate_image(&outputs, &remap) {
            Ok(image) => image,
            Err(err) => {
                eprintln!("Error: {}", err);
                exit(1);
            }
        };
        if let Err(err) = fs::write(&self.output, &image) {
            eprintln!("Error writing {}: {}", self.output.display(), err);
            exit(1);
        }
        println!(
            "Wrote {} bytes for {} outputs to {}",
            image.len(),
            outputs.len(),
            self.output.display()
        );
    }
}

/// Command arguments for fuse map informations
#[derive(Args)]
pub struct ShowArgs {
    /// Fuse map to show
    jed: PathBuf,
}

impl ShowArgs {
    /// Run fuse map informations
    pub fn run(&self) {
        let jed = read_fusemap(&self.jed);
        println!("Part: {}", jed.part_number.as_deref().unwrap_or("(none)"));
        println!("Fuse count: {}", jed.fuse_count);
        match jed.checksum_section {
            Some(checksum) => println!("Section checksum: {:#06X}", checksum),
            None => println!("Section checksum: (none)"),
        }
        match jed.checksum_file {
            Some(checksum) => println!("File checksum: {:#06X}", checksum),
            None => println!("File checksum: (none)"),
        }
        let layout = RowLayout::default();
        let width = layout.row_width();
        if jed.fuses.len() >= layout.num_outputs
            && (jed.fuses.len() - layout.num_outputs) % width == 0
        {
            println!(
                "Product rows: {}",
                (jed.fuses.len() - layout.num_outputs) / width
            );
        } else {
            println!(
                "Fuse count does not match the {}n+{} row layout",
                width, layout.num_outputs
            );
        }
    }
}

/// Command arguments for equivalence checking
#[derive(Args)]
pub struct EquivArgs {
    /// First equation file to compare
    file1: PathBuf,

    /// Second equation file to compare
    file2: PathBuf,

    /// Number of inputs spanning the address space
    #[arg(long, default_value_t = 15)]
    num_inputs: usize,

    /// Compare this many random addresses instead of the whole space
    #[arg(short = 'r', long)]
    num_random: Option<usize>,

    /// Seed for random address generation
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

impl EquivArgs {
    /// Run equivalence checking
    pub fn run(&self) {
        let remap = PinRemapTable::identity(self.num_inputs);
        let a = compile_outputs(&self.file1, &remap);
        let b = compile_outputs(&self.file2, &remap);
        if a.len() != b.len() {
            println!(
                "Different number of outputs: {} vs {}. Equation sets are not equivalent",
                a.len(),
                b.len()
            );
            exit(1);
        }
        let res = match self.num_random {
            Some(nb_patterns) => {
                check_equivalence_random(&a, &b, self.num_inputs, nb_patterns, self.seed)
            }
            None => check_equivalence(&a, &b, self.num_inputs),
        };
        match res {
            Err(mismatch) => {
                println!("Equation sets are not equivalent");
                println!(
                    "Output {} differs at address {:#x}",
                    a[mismatch.output].name, mismatch.address
                );
                exit(1);
            }
            Ok(()) => {
                if self.num_random.is_some() {
                    println!("Equation sets agree on the sampled addresses");
                } else {
                    println!("Equation sets are equivalent");
                }
                exit(0);
            }
        }
    }
}

fn read_text(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("Error reading {}: {}", path.display(), err);
            exit(1);
        }
    }
}

fn read_fusemap(path: &Path) -> JedFile {
    match JedFile::parse(&read_text(path)) {
        Ok(jed) => jed,
        Err(err) => {
            eprintln!("Error in {}: {}", path.display(), err);
            exit(1);
        }
    }
}

fn compile_outputs(path: &Path, remap: &PinRemapTable) -> Vec<OutputFn> {
    match compile_equations(&read_text(path), remap) {
        Ok(outputs) => outputs,
        Err(err) => {
            eprintln!("Error in {}: {}", path.display(), err);
            exit(1);
        }
    }
}

fn report_warnings(synthesis: &Synthesis) {
    for warning in &synthesis.warnings {
        eprintln!("Warning: {}", warning);
    }
}

fn write_equations(output: Option<&Path>, equations: &[Equation]) {
    let mut text = String::new();
    writeln!(text, "# Boolean equations").unwrap();
    writeln!(text, "# Generated by palrom").unwrap();
    for equation in equations {
        writeln!(text, "{}", equation).unwrap();
    }
    match output {
        Some(path) => {
            if let Err(err) = fs::write(path, &text) {
                eprintln!("Error writing {}: {}", path.display(), err);
                exit(1);
            }
            println!("Wrote {} equations to {}", equations.len(), path.display());
        }
        None => print!("{}", text),
    }
}
