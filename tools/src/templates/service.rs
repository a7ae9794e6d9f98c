//! Service artifacts

use std::fmt::Write;

use super::{core_imports, SOURCE_HEADER};

/// Normalized service options
#[derive(Debug, Clone)]
pub struct ServiceOptions<'a> {
    pub injectable: bool,
    pub dependencies: &'a [String],
    pub service_type: &'a str,
    pub caching: bool,
    pub error_handling: bool,
}

impl Default for ServiceOptions<'_> {
    fn default() -> Self {
        Self {
            injectable: true,
            dependencies: &[],
            service_type: "utility",
            caching: false,
            error_handling: true,
        }
    }
}

/// `service_name` is the full class name, e.g. `ProductRatingService`
pub fn service_ts(service_name: &str, opts: &ServiceOptions<'_>) -> String {
    let mut out = String::new();
    out.push_str(SOURCE_HEADER);
    out.push('\n');
    out.push_str("import { Injectable } from '@angular/core';\n");
    if opts.caching || opts.error_handling {
        out.push_str("import { Observable, of } from 'rxjs';\n");
    }
    if opts.caching {
        out.push_str("import { shareReplay } from 'rxjs/operators';\n");
    }
    if opts.error_handling {
        out.push_str("import { catchError } from 'rxjs/operators';\n");
    }
    out.push_str(&core_imports(opts.dependencies));
    out.push('\n');

    if opts.injectable {
        out.push_str("@Injectable({\n  providedIn: 'root',\n})\n");
    }
    let _ = writeln!(out, "export class {service_name} {{");
    let _ = writeln!(out, "  // {} service", opts.service_type);

    if opts.caching {
        out.push_str("  protected cache = new Map<string, Observable<unknown>>();\n\n");
    }

    let params: Vec<String> = opts
        .dependencies
        .iter()
        .map(|dep| format!("protected {}: {dep}", lower_first(dep)))
        .collect();
    if params.is_empty() {
        out.push_str("  constructor() {}\n");
    } else {
        let _ = writeln!(out, "  constructor({}) {{}}", params.join(", "));
    }

    if opts.caching {
        out.push_str(
            r#"
  protected cached<T>(key: string, source: Observable<T>): Observable<T> {
    if (!this.cache.has(key)) {
      this.cache.set(key, source.pipe(shareReplay(1)));
    }
    return this.cache.get(key) as Observable<T>;
  }
"#,
        );
    }

    if opts.error_handling {
        out.push_str(
            r#"
  protected handleError<T>(fallback: T) {
    return catchError<T, Observable<T>>((error) => {
      console.error(error);
      return of(fallback);
    });
  }
"#,
        );
    }

    out.push_str("}\n");
    out
}

pub fn service_spec(service_name: &str, file_base: &str) -> String {
    format!(
        r#"{SOURCE_HEADER}
import {{ TestBed }} from '@angular/core/testing';
import {{ {service_name} }} from './{file_base}.service';

describe('{service_name}', () => {{
  let service: {service_name};

  beforeEach(() => {{
    TestBed.configureTestingModule({{}});
    service = TestBed.inject({service_name});
  }});

  it('should be created', () => {{
    expect(service).toBeTruthy();
  }});
}});
"#
    )
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_service() {
        let ts = service_ts("CartService", &ServiceOptions::default());
        assert!(ts.contains("@Injectable({\n  providedIn: 'root',\n})"));
        assert!(ts.contains("export class CartService {"));
        assert!(ts.contains("constructor() {}"));
        assert!(ts.contains("handleError"));
        assert!(!ts.contains("shareReplay"));
    }

    #[test]
    fn test_dependencies_injected() {
        let deps = vec!["ProductService".to_string()];
        let opts = ServiceOptions {
            dependencies: &deps,
            caching: true,
            ..Default::default()
        };
        let ts = service_ts("RatingService", &opts);
        assert!(ts.contains("import { ProductService } from '@spartacus/core';"));
        assert!(ts.contains("constructor(protected productService: ProductService) {}"));
        assert!(ts.contains("shareReplay(1)"));
    }

    #[test]
    fn test_not_injectable() {
        let opts = ServiceOptions {
            injectable: false,
            ..Default::default()
        };
        assert!(!service_ts("PlainService", &opts).contains("@Injectable("));
    }

    #[test]
    fn test_spec_imports_service() {
        let spec = service_spec("CartService", "cart");
        assert!(spec.contains("import { CartService } from './cart.service';"));
    }
}
