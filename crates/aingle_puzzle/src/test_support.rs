//! Builders shared by the unit tests.

use crate::term::Term;

/// `fact!("vive_en", "juan", "C")` treats capitalised arguments as variables
/// and everything else as constants.
macro_rules! fact {
    ($pred:expr $(, $arg:expr)* $(,)?) => {
        $crate::fact::Fact::new($pred, vec![$($crate::test_support::term($arg)),*])
    };
}

pub(crate) fn term(text: &str) -> Term {
    if text.starts_with(|c: char| c.is_uppercase()) {
        Term::var(text)
    } else {
        Term::constant(text)
    }
}
