//! Component artifacts: class, template, styles, spec, module and barrel

use super::{core_imports, SOURCE_HEADER};

/// Names every component artifact is derived from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentNames {
    /// `ProductRating`
    pub class_name: String,
    /// `product-rating`
    pub file_base: String,
    /// `cx-product-rating`
    pub selector: String,
    /// `product.rating`
    pub translation_key: String,
}

impl ComponentNames {
    pub fn new(name: &str, selector: &str) -> Self {
        Self {
            class_name: crate::naming::to_pascal_case(name),
            file_base: crate::naming::to_kebab_case(name),
            selector: crate::naming::normalize_selector(selector),
            translation_key: crate::naming::translation_key(name),
        }
    }

    /// Root CSS block, the selector without its prefix
    pub fn block(&self) -> &str {
        crate::naming::selector_block(&self.selector)
    }
}

pub fn component_ts(names: &ComponentNames, dependencies: &[String]) -> String {
    let ComponentNames {
        class_name,
        file_base,
        selector,
        ..
    } = names;
    let imports = core_imports(dependencies);
    format!(
        r#"{SOURCE_HEADER}
import {{ ChangeDetectionStrategy, Component }} from '@angular/core';
{imports}
@Component({{
  selector: '{selector}',
  templateUrl: './{file_base}.component.html',
  styleUrls: ['./{file_base}.component.scss'],
  changeDetection: ChangeDetectionStrategy.OnPush,
  standalone: false,
}})
export class {class_name}Component {{
  constructor() {{
    // TODO: Implement component logic
  }}
}}
"#
    )
}

pub fn component_html(names: &ComponentNames) -> String {
    let block = names.block();
    let key = &names.translation_key;
    format!(
        r#"<!--
  SPDX-FileCopyrightText: 2025 SAP Spartacus team <spartacus-team@sap.com>
  SPDX-License-Identifier: Apache-2.0
-->

<div class="{block}">
  <h2 class="{block}__title">{{{{ '{key}.title' | cxTranslate }}}}</h2>

  <p class="{block}__description">{{{{ '{key}.description' | cxTranslate }}}}</p>
</div>
"#
    )
}

pub fn component_scss(names: &ComponentNames) -> String {
    let block = names.block();
    format!(
        r#"{SOURCE_HEADER}
@import '@spartacus/styles/scss/theme';

.{block} {{
  &__title {{
    @include type-style('heading', 2);
    margin-bottom: var(--cx-margin, 1rem);
  }}

  &__description {{
    @include type-style('body');
    color: var(--cx-color-text);
  }}
}}
"#
    )
}

pub fn component_spec(names: &ComponentNames) -> String {
    let ComponentNames {
        class_name,
        file_base,
        ..
    } = names;
    format!(
        r#"{SOURCE_HEADER}
import {{ ComponentFixture, TestBed }} from '@angular/core/testing';
import {{ I18nTestingModule }} from '@spartacus/core';
import {{ {class_name}Component }} from './{file_base}.component';

describe('{class_name}Component', () => {{
  let component: {class_name}Component;
  let fixture: ComponentFixture<{class_name}Component>;

  beforeEach(async () => {{
    await TestBed.configureTestingModule({{
      declarations: [{class_name}Component],
      imports: [I18nTestingModule],
    }}).compileComponents();

    fixture = TestBed.createComponent({class_name}Component);
    component = fixture.componentInstance;
    fixture.detectChanges();
  }});

  it('should create', () => {{
    expect(component).toBeTruthy();
  }});
}});
"#
    )
}

/// NgModule declaring the component, with an optional CMS mapping
pub fn component_module_ts(names: &ComponentNames, cms_component: Option<&str>) -> String {
    let ComponentNames {
        class_name,
        file_base,
        ..
    } = names;
    let module_name = crate::naming::module_name(class_name);
    let providers = match cms_component {
        Some(cms) => format!(
            r#"
    provideDefaultConfig(<CmsConfig>{{
      cmsComponents: {{
        {cms}: {{
          component: {class_name}Component,
        }},
      }},
    }}),
  "#
        ),
        None => String::new(),
    };
    format!(
        r#"{SOURCE_HEADER}
import {{ CommonModule }} from '@angular/common';
import {{ NgModule }} from '@angular/core';
import {{ CmsConfig, I18nModule, provideDefaultConfig }} from '@spartacus/core';
import {{ {class_name}Component }} from './{file_base}.component';

@NgModule({{
  imports: [CommonModule, I18nModule],
  providers: [{providers}],
  declarations: [{class_name}Component],
  exports: [{class_name}Component],
}})
export class {module_name} {{}}
"#
    )
}

/// Barrel file re-exporting whichever artifacts were generated
pub fn index_ts(file_base: &str, has_module: bool, has_service: bool, has_model: bool) -> String {
    let mut exports = vec![format!("export * from './{file_base}.component';")];
    if has_module {
        exports.push(format!("export * from './{file_base}.module';"));
    }
    if has_service {
        exports.push(format!("export * from './{file_base}.service';"));
    }
    if has_model {
        exports.push(format!("export * from './{file_base}.model';"));
    }
    format!("{SOURCE_HEADER}\n{}\n", exports.join("\n"))
}
