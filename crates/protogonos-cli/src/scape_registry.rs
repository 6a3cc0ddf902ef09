// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! Name-to-`Scape` resolution. The workspace ships exactly one scape
//! (`xor`); anything else is a contract for a collaborator this crate
//! doesn't implement, so an unknown name is a clear error rather than
//! a silent fallback.

use anyhow::{bail, Result};
use protogonos_scape::{Scape, XorScape};
use std::sync::Arc;

pub fn resolve_scape(name: &str) -> Result<Arc<dyn Scape>> {
    match name {
        "xor" => Ok(Arc::new(XorScape)),
        other => bail!("unknown scape '{other}'; only 'xor' is built into this workspace"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_the_builtin_xor_scape() {
        let scape = resolve_scape("xor").unwrap();
        assert_eq!(scape.name(), "xor");
    }

    #[test]
    fn unknown_scape_name_is_an_error() {
        assert!(resolve_scape("flatland").is_err());
    }
}
