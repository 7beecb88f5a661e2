//! State variables and the UPnP data type vocabulary.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The fixed data type vocabulary of service descriptions.
///
/// Each variant maps to exactly one canonical descriptor string, matched
/// case-sensitively; [`DataType::as_str`] and [`FromStr`] are inverses of
/// each other over the whole vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Ui1,
    Ui2,
    Ui4,
    I1,
    I2,
    I4,
    Int,
    R4,
    R8,
    Number,
    Fixed14_4,
    Float,
    Char,
    String,
    Date,
    DateTime,
    DateTimeTz,
    Time,
    TimeTz,
    Boolean,
    BinBase64,
    BinHex,
    Uri,
    Uuid,
}

impl DataType {
    /// Every data type, in vocabulary order.
    pub const ALL: [DataType; 24] = [
        DataType::Ui1,
        DataType::Ui2,
        DataType::Ui4,
        DataType::I1,
        DataType::I2,
        DataType::I4,
        DataType::Int,
        DataType::R4,
        DataType::R8,
        DataType::Number,
        DataType::Fixed14_4,
        DataType::Float,
        DataType::Char,
        DataType::String,
        DataType::Date,
        DataType::DateTime,
        DataType::DateTimeTz,
        DataType::Time,
        DataType::TimeTz,
        DataType::Boolean,
        DataType::BinBase64,
        DataType::BinHex,
        DataType::Uri,
        DataType::Uuid,
    ];

    /// The canonical descriptor string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Ui1 => "ui1",
            DataType::Ui2 => "ui2",
            DataType::Ui4 => "ui4",
            DataType::I1 => "i1",
            DataType::I2 => "i2",
            DataType::I4 => "i4",
            DataType::Int => "int",
            DataType::R4 => "r4",
            DataType::R8 => "r8",
            DataType::Number => "number",
            DataType::Fixed14_4 => "fixed.14.4",
            DataType::Float => "float",
            DataType::Char => "char",
            DataType::String => "string",
            DataType::Date => "date",
            DataType::DateTime => "dateTime",
            DataType::DateTimeTz => "dateTime.tz",
            DataType::Time => "time",
            DataType::TimeTz => "time.tz",
            DataType::Boolean => "boolean",
            DataType::BinBase64 => "bin.base64",
            DataType::BinHex => "bin.hex",
            DataType::Uri => "uri",
            DataType::Uuid => "uuid",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `dataType` descriptor outside the fixed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown dataType descriptor: {0}")]
pub struct UnknownDataType(pub String);

impl FromStr for DataType {
    type Err = UnknownDataType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::ALL
            .iter()
            .find(|data_type| data_type.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownDataType(s.to_owned()))
    }
}

/// A named, typed value a service tracks and exposes through its actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateVariable {
    name: String,
    data_type: DataType,
    value: Option<String>,
}

impl StateVariable {
    pub(crate) fn new(name: String, data_type: DataType, value: Option<String>) -> Self {
        Self {
            name,
            data_type,
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// The default value declared by the description, if any.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_round_trip_covers_the_vocabulary() {
        for data_type in DataType::ALL {
            let descriptor = data_type.as_str();
            assert_eq!(descriptor.parse::<DataType>().unwrap(), data_type);
        }
    }

    #[test]
    fn descriptors_are_unique() {
        for (i, a) in DataType::ALL.iter().enumerate() {
            for b in &DataType::ALL[i + 1..] {
                assert_ne!(a.as_str(), b.as_str());
            }
        }
    }

    #[test]
    fn descriptor_matching_is_case_sensitive() {
        assert!("datetime".parse::<DataType>().is_err());
        assert!("DateTime".parse::<DataType>().is_err());
        assert_eq!("dateTime".parse::<DataType>().unwrap(), DataType::DateTime);
    }

    #[test]
    fn unknown_descriptor_is_reported() {
        let err = "i8".parse::<DataType>().unwrap_err();
        assert_eq!(err, UnknownDataType("i8".to_string()));
    }
}
