//! Where capability (PICS) flags come from.

use std::collections::HashMap;

use matter_pics_parser::PicsSet;

pub trait CapabilitySource: Send + Sync {
    /// True when `code` is declared as supported. Undeclared codes are not
    /// supported.
    fn has(&self, code: &str) -> bool;
}

impl CapabilitySource for PicsSet {
    fn has(&self, code: &str) -> bool {
        self.supports(code)
    }
}

impl CapabilitySource for HashMap<String, bool> {
    fn has(&self, code: &str) -> bool {
        self.get(code.trim()).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undeclared_codes_are_absent() {
        let pics: PicsSet = "MWOM.S.A0000=1\nMWOM.S.C00.Rsp=0".parse().unwrap();
        assert!(pics.has("MWOM.S.A0000"));
        assert!(!pics.has("MWOM.S.C00.Rsp"));
        assert!(!pics.has("MWOM.S.C01.Tx"));

        let map = HashMap::from([("MWOM.S.A0001".to_string(), true)]);
        assert!(map.has(" MWOM.S.A0001 "));
        assert!(!map.has("MWOM.S.A0000"));
    }
}
