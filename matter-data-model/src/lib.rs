use std::fmt;

pub mod clusters;
pub mod command;
pub mod endpoint_composition;
pub mod value;

pub use command::{
    CommandRequest, CommandResponse, FieldSpec, ImStatus, InvokeResponse, ResponseSchema,
    ShapeCheck,
};
pub use endpoint_composition::{AttributeInstance, ClusterInstance, DeviceType, Endpoint};
pub use value::{DecodeError, Value, ValueKind};

/// Identifies an endpoint on a node. 0xFFFF is reserved as a wildcard and
/// never addresses a real endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EndpointId(pub u16);

impl EndpointId {
    pub const MAX: u16 = 0xFFFE;

    pub fn new(id: u16) -> Option<Self> {
        (id <= Self::MAX).then_some(Self(id))
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! hex_id {
    ($(#[$meta:meta])* $name:ident, $width:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{:0width$X}", self.0, width = $width)
            }
        }
    };
}

hex_id!(
    /// Cluster identifier (e.g. 0x005E for Microwave Oven Mode)
    ClusterId,
    4
);
hex_id!(AttributeId, 4);
hex_id!(CommandId, 2);

/// Names one attribute of one cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeDescriptor {
    pub cluster: ClusterId,
    pub attribute: AttributeId,
    pub name: &'static str,
}

impl fmt::Display for AttributeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/{})", self.name, self.cluster, self.attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_as_hex() {
        assert_eq!(ClusterId(0x5E).to_string(), "0x005E");
        assert_eq!(AttributeId(1).to_string(), "0x0001");
        assert_eq!(CommandId(0).to_string(), "0x00");
        assert_eq!(EndpointId(3).to_string(), "3");
    }

    #[test]
    fn wildcard_endpoint_is_rejected() {
        assert_eq!(EndpointId::new(1), Some(EndpointId(1)));
        assert_eq!(EndpointId::new(0xFFFE), Some(EndpointId(0xFFFE)));
        assert_eq!(EndpointId::new(0xFFFF), None);
    }
}
