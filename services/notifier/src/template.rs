//! Email templates
//!
//! Templates are plain strings with `{key}` placeholders filled from the
//! job's template data. Unknown placeholders are left intact so a missing
//! key is visible in the delivered mail instead of silently vanishing.

use common::error::{ServiceError, ServiceResult};
use std::collections::HashMap;

const ACCOUNT_CREATED: &str = "\
Hi {Name},

Welcome to shopstream! Your account is ready.
You are registered with {Email}.

The shopstream team";

const ORDER_CONFIRMATION: &str = "\
Hi {Name},

Thanks for your order {Order}.

Items:
{Items}

Total: {Total}

The shopstream team";

/// Render a named template with the given data
pub fn render(template_name: &str, data: &HashMap<String, String>) -> ServiceResult<String> {
    let template = match template_name {
        "account_created" => ACCOUNT_CREATED,
        "order_confirmation" => ORDER_CONFIRMATION,
        other => {
            return Err(ServiceError::NotFound(format!(
                "unknown email template: {}",
                other
            )));
        }
    };

    Ok(substitute(template, data))
}

fn substitute(template: &str, data: &HashMap<String, String>) -> String {
    let mut out = template.to_string();
    for (key, value) in data {
        out = out.replace(&format!("{{{}}}", key), value);
    }
    out
}
