//! Feature, shared and core NgModules

use super::SOURCE_HEADER;

/// `components` are PascalCase component class prefixes (`ProductRating`)
pub fn feature_module_ts(
    module_name: &str,
    file_base: &str,
    components: &[String],
    routing: bool,
) -> String {
    let mut imports = vec![
        "import { CommonModule } from '@angular/common';".to_string(),
        "import { NgModule } from '@angular/core';".to_string(),
        "import { I18nModule } from '@spartacus/core';".to_string(),
    ];
    if routing {
        let routing_module = routing_module_name(module_name);
        imports.push(format!(
            "import {{ {routing_module} }} from './{file_base}-routing.module';"
        ));
    }
    for component in components {
        let kebab = crate::naming::to_kebab_case(component);
        let class = crate::naming::to_pascal_case(component);
        imports.push(format!(
            "import {{ {class}Component }} from './{kebab}/{kebab}.component';"
        ));
    }

    let mut module_imports = vec!["CommonModule".to_string(), "I18nModule".to_string()];
    if routing {
        module_imports.push(routing_module_name(module_name));
    }
    let declared: Vec<String> = components
        .iter()
        .map(|c| format!("{}Component", crate::naming::to_pascal_case(c)))
        .collect();

    format!(
        r#"{SOURCE_HEADER}
{imports}

@NgModule({{
  imports: [{module_imports}],
  declarations: [{declared}],
  exports: [{declared}],
}})
export class {module_name} {{}}
"#,
        imports = imports.join("\n"),
        module_imports = module_imports.join(", "),
        declared = declared.join(", "),
    )
}

pub fn routing_module_ts(module_name: &str) -> String {
    let routing_module = routing_module_name(module_name);
    format!(
        r#"{SOURCE_HEADER}
import {{ NgModule }} from '@angular/core';
import {{ RouterModule, Routes }} from '@angular/router';

const routes: Routes = [];

@NgModule({{
  imports: [RouterModule.forChild(routes)],
  exports: [RouterModule],
}})
export class {routing_module} {{}}
"#
    )
}

pub fn module_index_ts(file_base: &str, routing: bool) -> String {
    let mut exports = vec![format!("export * from './{file_base}.module';")];
    if routing {
        exports.push(format!("export * from './{file_base}-routing.module';"));
    }
    format!("{SOURCE_HEADER}\n{}\n", exports.join("\n"))
}

/// `CheckoutModule` → `CheckoutRoutingModule`
fn routing_module_name(module_name: &str) -> String {
    let base = module_name.strip_suffix("Module").unwrap_or(module_name);
    format!("{base}RoutingModule")
}
