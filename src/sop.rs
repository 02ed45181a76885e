//! Sum-of-products equations and their text rendering

use std::fmt;

use itertools::Itertools;

/// A signed reference to an input bit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Literal {
    /// 0-based input index; `A1` is index 0
    pub index: usize,
    /// True for the negated literal `!A<k>`
    pub negated: bool,
}

impl Literal {
    /// The positive literal for an input
    pub fn positive(index: usize) -> Literal {
        Literal {
            index,
            negated: false,
        }
    }

    /// The negated literal for an input
    pub fn negative(index: usize) -> Literal {
        Literal {
            index,
            negated: true,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "!")?;
        }
        write!(f, "A{}", self.index + 1)
    }
}

/// Conjunction of literals forming one product term
///
/// A term with no literals is the degenerate always-true case. The
/// synthesizers diagnose such terms and never include them in an output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductTerm {
    /// Literals of the conjunction, in source order
    pub literals: Vec<Literal>,
}

impl ProductTerm {
    /// Returns true if the term has no literals
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }
}

impl fmt::Display for ProductTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.literals.is_empty() {
            write!(f, "1")
        } else {
            write!(f, "{}", self.literals.iter().join(" & "))
        }
    }
}

/// A named output as a disjunction of product terms, with an inversion flag
/// for active-low outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equation {
    /// Output name, `Y1`..`Yn`
    pub name: String,
    /// Included product terms, in row order; empty means constant 0
    pub terms: Vec<ProductTerm>,
    /// True for an active-low output
    pub inverted: bool,
}

impl fmt::Display for Equation {
    /// Render the equation as re-parseable text
    ///
    /// Product terms go one per line, continuation lines starting with `+`.
    /// An active-low output wraps the whole disjunction in `!(...)`, an
    /// output with no terms renders as the constant 0. Every equation is
    /// terminated with `;`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return if self.inverted {
                write!(f, "{} = !(0);", self.name)
            } else {
                write!(f, "{} = 0;", self.name)
            };
        }
        if self.inverted {
            writeln!(f, "{} = !(", self.name)?;
        } else {
            writeln!(f, "{} =", self.name)?;
        }
        for (i, term) in self.terms.iter().enumerate() {
            let prefix = if i == 0 { "  " } else { "  + " };
            let last = i + 1 == self.terms.len();
            if last && !self.inverted {
                write!(f, "{}({});", prefix, term)?;
            } else {
                writeln!(f, "{}({})", prefix, term)?;
            }
        }
        if self.inverted {
            write!(f, ");")?;
        }
        Ok(())
    }
}

/// Name and polarity of an output to assemble
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    /// Output name
    pub name: String,
    /// True for an active-low output
    pub inverted: bool,
}

/// A product term together with its per-output inclusion flags
///
/// This is the common shape both synthesis front-ends reduce their source
/// format to before assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermRow {
    /// The product term decoded from one row or column
    pub term: ProductTerm,
    /// One flag per output, true if the term feeds that output
    pub included: Vec<bool>,
}

/// Assemble one sum-of-products equation per output from decoded term rows
///
/// Row order is preserved within each equation. Empty terms are never
/// included, whatever their inclusion flags say. An output left with no
/// terms becomes the constant 0 and is diagnosed through `warnings`.
pub fn assemble(
    outputs: &[OutputSpec],
    rows: &[TermRow],
    warnings: &mut Vec<String>,
) -> Vec<Equation> {
    let mut ret = Vec::new();
    for (i, spec) in outputs.iter().enumerate() {
        let terms: Vec<ProductTerm> = rows
            .iter()
            .filter(|row| !row.term.is_empty() && row.included[i])
            .map(|row| row.term.clone())
            .collect();
        if terms.is_empty() {
            warnings.push(format!(
                "output {} has no product terms and is constant 0",
                spec.name
            ));
        }
        ret.push(Equation {
            name: spec.name.clone(),
            terms,
            inverted: spec.inverted,
        });
    }
    ret
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_display() {
        assert_eq!(Literal::positive(0).to_string(), "A1");
        assert_eq!(Literal::negative(2).to_string(), "!A3");
    }

    #[test]
    fn test_term_display() {
        let term = ProductTerm {
            literals: vec![Literal::positive(0), Literal::negative(1)],
        };
        assert_eq!(term.to_string(), "A1 & !A2");
        assert_eq!(ProductTerm::default().to_string(), "1");
    }

    #[test]
    fn test_equation_display() {
        let t1 = ProductTerm {
            literals: vec![Literal::positive(0), Literal::negative(1)],
        };
        let t2 = ProductTerm {
            literals: vec![Literal::positive(2)],
        };
        let eq = Equation {
            name: "Y1".to_string(),
            terms: vec![t1.clone(), t2.clone()],
            inverted: false,
        };
        assert_eq!(eq.to_string(), "Y1 =\n  (A1 & !A2)\n  + (A3);");
        let eq = Equation {
            name: "Y2".to_string(),
            terms: vec![t1, t2],
            inverted: true,
        };
        assert_eq!(eq.to_string(), "Y2 = !(\n  (A1 & !A2)\n  + (A3)\n);");
    }

    #[test]
    fn test_constant_display() {
        let eq = Equation {
            name: "Y3".to_string(),
            terms: Vec::new(),
            inverted: false,
        };
        assert_eq!(eq.to_string(), "Y3 = 0;");
        let eq = Equation {
            name: "Y4".to_string(),
            terms: Vec::new(),
            inverted: true,
        };
        assert_eq!(eq.to_string(), "Y4 = !(0);");
    }

    #[test]
    fn test_assemble() {
        let outputs = vec![
            OutputSpec {
                name: "Y1".to_string(),
                inverted: false,
            },
            OutputSpec {
                name: "Y2".to_string(),
                inverted: true,
            },
        ];
        let term = ProductTerm {
            literals: vec![Literal::positive(0)],
        };
        let rows = vec![
            TermRow {
                term: term.clone(),
                included: vec![true, false],
            },
            // Empty term: included flags must be ignored
            TermRow {
                term: ProductTerm::default(),
                included: vec![true, true],
            },
        ];
        let mut warnings = Vec::new();
        let equations = assemble(&outputs, &rows, &mut warnings);
        assert_eq!(equations.len(), 2);
        assert_eq!(equations[0].terms, vec![term]);
        assert!(!equations[0].inverted);
        assert!(equations[1].terms.is_empty());
        assert!(equations[1].inverted);
        assert_eq!(warnings.len(), 1);
    }
}
