use std::fmt;
use std::str::FromStr;

/// The closed set of table columns this tool manages.
///
/// The set is fixed at compile time. Every column has a stable tag (the
/// identifier used on the CLI and in the copied layout) and a humanized
/// label used for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnId {
    Location,
    NumbersOfFlat,
    Category,
    Type,
    Status,
    PublishDate,
    ActiveInactive,
}

impl ColumnId {
    pub const ALL: [ColumnId; 7] = [
        ColumnId::Location,
        ColumnId::NumbersOfFlat,
        ColumnId::Category,
        ColumnId::Type,
        ColumnId::Status,
        ColumnId::PublishDate,
        ColumnId::ActiveInactive,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            ColumnId::Location => "location",
            ColumnId::NumbersOfFlat => "numbersOfFlat",
            ColumnId::Category => "category",
            ColumnId::Type => "type",
            ColumnId::Status => "status",
            ColumnId::PublishDate => "publishDate",
            ColumnId::ActiveInactive => "activeInactive",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColumnId::Location => "Location",
            ColumnId::NumbersOfFlat => "Numbers Of Flat",
            ColumnId::Category => "Category",
            ColumnId::Type => "Type",
            ColumnId::Status => "Status",
            ColumnId::PublishDate => "Publish Date",
            ColumnId::ActiveInactive => "Active Inactive",
        }
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for ColumnId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        ColumnId::ALL
            .iter()
            .find(|c| c.tag().to_ascii_lowercase() == needle)
            .copied()
            .ok_or_else(|| format!("unknown column \"{}\"", s))
    }
}
