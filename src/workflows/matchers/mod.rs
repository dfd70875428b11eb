use crate::domain::models::FieldSet;

pub trait Matcher {
    /// Returns the fields a filename yields, or `None` when it does not match.
    fn match_file(&self, file_name: &str) -> Result<Option<FieldSet>, pattern::MatchError>;
}

pub mod pattern;
