//! Impl the `serde::Serialize` and `serde::Deserialize` traits.

use crate::BoseBuf;
use std::fmt::Formatter;

#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
impl serde::Serialize for BoseBuf {
    #[inline]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        if serializer.is_human_readable() {
            let mut buf = String::new();
            self.format_to(false, &mut buf).map_err(serde::ser::Error::custom)?;
            buf.serialize(serializer)
        } else {
            serializer.serialize_bytes(self.as_bytes())
        }
    }
}

#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
impl<'de> serde::Deserialize<'de> for BoseBuf {
    #[inline]
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        struct BoseBufVisitor;

        impl<'de> serde::de::Visitor<'de> for BoseBufVisitor {
            type Value = BoseBuf;

            #[inline]
            fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
                write!(formatter, "a bose buf")
            }

            #[inline]
            fn visit_str<E>(self, v: &str) -> Result<BoseBuf, E>
            where
                E: serde::de::Error,
            {
                BoseBuf::parse(v).map_err(serde::de::Error::custom)
            }

            #[inline]
            fn visit_bytes<E>(self, v: &[u8]) -> Result<BoseBuf, E>
            where
                E: serde::de::Error,
            {
                BoseBuf::new(v.to_vec()).map_err(serde::de::Error::custom)
            }
        }

        if deserializer.is_human_readable() {
            deserializer.deserialize_str(BoseBufVisitor)
        } else {
            deserializer.deserialize_bytes(BoseBufVisitor)
        }
    }
}
