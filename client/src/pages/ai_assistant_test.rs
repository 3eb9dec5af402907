use super::*;

#[test]
fn markdown_renders_emphasis_and_lists() {
    let html = render_markdown_html("**Top deals**\n\n- Acme\n- Globex");
    assert!(html.contains("<strong>Top deals</strong>"));
    assert!(html.contains("<li>Acme</li>"));
}

#[test]
fn raw_html_is_dropped() {
    let html = render_markdown_html("hello <script>alert(1)</script>\n\n<div onclick=\"x\">block</div>");
    assert!(!html.contains("<script>"));
    assert!(!html.contains("onclick"));
    assert!(html.contains("hello"));
}
