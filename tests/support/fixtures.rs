//! Listing page fixtures shaped like common web server auto-indexes.

/// Builds an Apache-style index page with one row per `(href, label)`.
#[must_use]
pub fn apache_index(title_path: &str, entries: &[(&str, &str)]) -> String {
    let mut rows = String::new();
    for (href, label) in entries {
        rows.push_str(&format!(
            "<tr><td valign=\"top\"><img src=\"/icons/unknown.gif\" alt=\"[   ]\"></td>\
             <td><a href=\"{href}\">{label}</a></td>\
             <td align=\"right\">2024-05-01 10:00  </td><td align=\"right\"> 12K</td></tr>\n"
        ));
    }
    format!(
        "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 3.2 Final//EN\">\n\
         <html><head><title>Index of {title_path}</title></head><body>\n\
         <h1>Index of {title_path}</h1>\n<table>\n\
         <tr><th><a href=\"?C=N;O=D\">Name</a></th><th><a href=\"?C=M;O=A\">Last modified</a></th></tr>\n\
         {rows}</table>\n</body></html>\n"
    )
}

/// The three-anchor listing used by the end-to-end scenarios.
#[must_use]
pub fn scenario_listing() -> String {
    apache_index(
        "/pub",
        &[
            ("../", "Parent Directory"),
            ("a.pdf", "a.pdf"),
            ("b.txt", "b.txt"),
        ],
    )
}
