//! Template library — pure renderers from normalized arguments to file text
//!
//! Nothing here touches the file system; generators decide paths and write.

pub mod component;
pub mod devops;
pub mod model;
pub mod module;
pub mod service;
pub mod theme;

/// Comment header carried by generated TypeScript and SCSS files
pub const SOURCE_HEADER: &str = "/*
 * SPDX-FileCopyrightText: 2025 SAP Spartacus team <spartacus-team@sap.com>
 *
 * SPDX-License-Identifier: Apache-2.0
 */
";

/// `import { X } from '@spartacus/core';` per dependency, or nothing
pub fn core_imports(dependencies: &[String]) -> String {
    dependencies
        .iter()
        .map(|dep| format!("import {{ {dep} }} from '@spartacus/core';\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_imports() {
        assert_eq!(core_imports(&[]), "");
        assert_eq!(
            core_imports(&["ProductService".into(), "CmsService".into()]),
            "import { ProductService } from '@spartacus/core';\nimport { CmsService } from '@spartacus/core';\n"
        );
    }
}
