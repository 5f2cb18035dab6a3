use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use std::fmt::{self, Formatter};
use std::hash::BuildHasher;
use std::marker::PhantomData;

use crate::config::TableConfig;
use crate::destructor::Destructor;
use crate::HashTable;

struct TableVisitor<V, D, S> {
    _marker: PhantomData<fn() -> (V, D, S)>,
}

impl<V, D, S> Serialize for HashTable<V, D, S>
where
    V: Serialize,
    D: Destructor<V>,
{
    fn serialize<Sr>(&self, serializer: Sr) -> Result<Sr::Ok, Sr::Error>
    where
        Sr: Serializer,
    {
        serializer.collect_map(self.iter())
    }
}

impl<'de, V, D, S> Deserialize<'de> for HashTable<V, D, S>
where
    V: Deserialize<'de>,
    D: Destructor<V> + Default,
    S: BuildHasher + Default,
{
    fn deserialize<De>(deserializer: De) -> Result<Self, De::Error>
    where
        De: Deserializer<'de>,
    {
        deserializer.deserialize_map(TableVisitor::new())
    }
}

impl<V, D, S> TableVisitor<V, D, S> {
    pub(crate) fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<'de, V, D, S> Visitor<'de> for TableVisitor<V, D, S>
where
    V: Deserialize<'de>,
    D: Destructor<V> + Default,
    S: BuildHasher + Default,
{
    type Value = HashTable<V, D, S>;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "a map with string keys")
    }

    fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut table = HashTable::with_config_destructor_and_hasher(
            TableConfig::default(),
            D::default(),
            S::default(),
        )
        .map_err(de::Error::custom)?;

        while let Some((key, value)) = access.next_entry::<String, V>()? {
            table.put(&key, value).map_err(de::Error::custom)?;
        }

        Ok(table)
    }
}
