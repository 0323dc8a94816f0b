//! Listing renderers: file-tree HTML fragments and JSON objects.
//!
//! The HTML family emits a flat `<ul class="fileTree">` whose entries carry
//! their navigation path in the anchor's `rel` attribute. Every
//! user-supplied string is escaped before it reaches the fragment.

use serde_json::json;

use crate::models::ProductPage;

/// Escapes text for safe placement in markup text or attribute values.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

pub fn policies_as_html(policies: &[String]) -> String {
    let mut out = String::from("<ul class=\"fileTree\" >");
    for policy in policies {
        let policy = html_escape(policy);
        out.push_str("<li class=\"directory collapsed\"><a href=\"#\" rel=\"/");
        out.push_str(&policy);
        out.push_str("/\">");
        out.push_str(&policy);
        out.push_str("</a></li>");
    }
    out.push_str("</ul>");
    out
}

pub fn policies_as_json(policies: &[String]) -> String {
    json!({
        "policies": policies,
        "succeed": true,
    })
    .to_string()
}

pub fn product_types_as_html(policy: &str, type_names: &[String]) -> String {
    let policy = html_escape(policy);
    let mut out = String::from("<ul class=\"fileTree\" >");
    for name in type_names {
        let name = html_escape(name);
        out.push_str("<li class=\"directory collapsed productType\"><a href=\"#\" rel=\"/");
        out.push_str(&policy);
        out.push('/');
        out.push_str(&name);
        out.push_str("/\">");
        out.push_str(&name);
        out.push_str("</a></li>");
    }
    out.push_str("</ul>");
    out
}

pub fn product_types_as_json(policy: &str, type_names: &[String]) -> String {
    let types: Vec<_> = type_names.iter().map(|name| json!({ "name": name })).collect();
    json!({
        "policy": policy,
        "productTypes": types,
    })
    .to_string()
}

pub fn products_as_html(page: &ProductPage, policy: &str, type_name: &str) -> String {
    let policy = html_escape(policy);
    let type_name = html_escape(type_name);
    let mut out = String::from("<ul class=\"fileTree\" >\r\n");
    for product in &page.page_products {
        out.push_str(" <li class=\"file\"><a href=\"#\" rel=\"/");
        out.push_str(&policy);
        out.push('/');
        out.push_str(&type_name);
        out.push('/');
        out.push_str(&html_escape(&product.id));
        out.push_str("\">");
        out.push_str(&html_escape(&product.name));
        out.push_str("</a></li>\r\n");
    }
    out.push_str("</ul>");
    out
}

pub fn products_as_json(page: &ProductPage, policy: &str, type_name: &str) -> String {
    let products: Vec<_> = page
        .page_products
        .iter()
        .map(|p| {
            json!({
                "id": p.id,
                "name": p.name,
                "path": format!("/{}/{}/{}", policy, type_name, p.id),
            })
        })
        .collect();
    json!({
        "policy": policy,
        "productType": type_name,
        "pageNum": page.page_num,
        "totalPages": page.total_pages,
        "products": products,
    })
    .to_string()
}
