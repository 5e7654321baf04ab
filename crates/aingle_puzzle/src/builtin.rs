//! Built-in constraint tables for common grid puzzles
//!
//! These tables cover:
//! - People (one nationality each, one house each)
//! - Houses (one colour and one position each, never shared)

use crate::consistency::{ConstraintTable, FunctionalConstraint};

/// Pre-defined constraint tables for Einstein-style grid puzzles.
///
/// The tables can be used directly or extended with extra constraints.
pub struct BuiltinConstraints;

impl BuiltinConstraints {
    /// Every built-in constraint combined.
    pub fn puzzle() -> ConstraintTable {
        let mut table = ConstraintTable::new("puzzle");
        for constraint in Self::people().constraints {
            table.add(constraint);
        }
        for constraint in Self::houses().constraints {
            table.add(constraint);
        }
        table
    }

    /// Constraints on what a person can be.
    pub fn people() -> ConstraintTable {
        let mut table = ConstraintTable::new("people");

        // es(juan, ingles): a person has one nationality. Two people may share one.
        table.add(FunctionalConstraint::functional("nationality", "es", 2, 0, 1));

        // vive_en(juan, casa1): one house per person and one person per house.
        table.add(FunctionalConstraint::bijection("residence", "vive_en", 2, 0, 1));

        table
    }

    /// Constraints on house attributes, `casa(attribute, house, value)`.
    pub fn houses() -> ConstraintTable {
        let mut table = ConstraintTable::new("houses");

        table.add(
            FunctionalConstraint::bijection("house_color", "casa", 3, 1, 2).tagged(0, "color"),
        );
        table.add(
            FunctionalConstraint::bijection("house_position", "casa", 3, 1, 2)
                .tagged(0, "posicion"),
        );

        table
    }

    /// An empty table: every fact set is consistent.
    pub fn none() -> ConstraintTable {
        ConstraintTable::new("none")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_puzzle_table() {
        let table = BuiltinConstraints::puzzle();
        assert_eq!(table.len(), 4);
        assert!(table.validate().is_ok());

        let names: Vec<&str> = table.constraints.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["nationality", "residence", "house_color", "house_position"]
        );
    }

    #[test]
    fn test_only_residence_and_houses_are_bijective() {
        let table = BuiltinConstraints::puzzle();
        let bijective: Vec<&str> = table
            .constraints
            .iter()
            .filter(|c| c.bijective)
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(bijective, vec!["residence", "house_color", "house_position"]);
    }

    #[test]
    fn test_house_tags() {
        let houses = BuiltinConstraints::houses();
        let color = &houses.constraints[0];
        assert!(color.applies_to(&fact!("casa", "color", "casa1", "rojo")));
        assert!(!color.applies_to(&fact!("casa", "posicion", "casa1", "1")));
        assert!(!color.applies_to(&fact!("casa", "color", "casa1")));
    }

    #[test]
    fn test_none_is_empty() {
        assert!(BuiltinConstraints::none().is_empty());
    }
}
