use crate::models::RecipeResult;

const INDEX_TEMPLATE: &str = include_str!("../../static/index.html");

/// Renders the upload page, optionally with a flash message and the result of
/// the last upload.
pub fn render_index(flash: Option<&str>, result: Option<&RecipeResult>) -> String {
    let flash_html = flash
        .filter(|message| !message.is_empty())
        .map(|message| format!(r#"<p class="flash">{}</p>"#, escape_html(message)))
        .unwrap_or_default();

    let results_html = result.map(render_result).unwrap_or_default();

    INDEX_TEMPLATE
        .replace("{{flash}}", &flash_html)
        .replace("{{results}}", &results_html)
}

fn render_result(result: &RecipeResult) -> String {
    let items = if result.ingredients.is_empty() {
        "<li><em>No edible ingredients found</em></li>".to_string()
    } else {
        result
            .ingredients
            .iter()
            .map(|item| format!("<li>{}</li>", escape_html(item)))
            .collect::<Vec<_>>()
            .join("\n      ")
    };

    format!(
        "<section>\n    <h2>Ingredients</h2>\n    <ul>\n      {}\n    </ul>\n    \
         <h2>Recipe</h2>\n    <pre>{}</pre>\n  </section>",
        items,
        escape_html(&result.recipe_text)
    )
}

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
