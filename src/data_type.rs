//! Data type.

use std::fmt::{Display, Formatter};

/// Base category of an encoded value, carried in the low bits of its
/// prefix byte's type info.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[repr(u8)]
pub enum DataType {
    Null = 0,
    Boolean = 1,
    Number = 2,
    String = 3,
    Array = 4,
    Object = 5,
}

impl DataType {
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            DataType::Null => "Null",
            DataType::Boolean => "Boolean",
            DataType::Number => "Number",
            DataType::String => "String",
            DataType::Array => "Array",
            DataType::Object => "Object",
        }
    }
}

impl Display for DataType {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
