/// Splits the normalizer's comma-separated answer into ingredient names.
///
/// `None` stands for a non-text model answer and yields no ingredients.
/// Pieces are trimmed and blank ones dropped; order, duplicates and case are
/// left alone.
pub fn parse_ingredient_list(text: Option<&str>) -> Vec<String> {
    let Some(text) = text else {
        return Vec::new();
    };

    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
