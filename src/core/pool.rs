use crate::domain::model::ModelKind;

/// Pool entries for a JSON request: everything when nothing was asked for,
/// otherwise the named models in pool order. Unknown names are ignored.
pub fn select_requested(requested: &[String]) -> Vec<ModelKind> {
    if requested.is_empty() {
        return ModelKind::POOL.to_vec();
    }
    named_kinds(requested)
}

/// Pool entries whose exact names appear in `names`, in pool order.
pub fn named_kinds(names: &[String]) -> Vec<ModelKind> {
    let named: Vec<ModelKind> = names
        .iter()
        .filter_map(|name| ModelKind::from_name(name))
        .collect();
    ModelKind::POOL
        .into_iter()
        .filter(|kind| named.contains(kind))
        .collect()
}

/// Splits the comma-separated `models` query parameter. Falls back to the
/// whole pool when the parameter is absent or holds no names.
pub fn parse_model_list(models: Option<&str>) -> Vec<String> {
    let names: Vec<String> = models
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    if names.is_empty() {
        ModelKind::POOL
            .iter()
            .map(|kind| kind.name().to_string())
            .collect()
    } else {
        names
    }
}

/// Case-insensitive membership test used for context-aware lookups.
pub fn is_selected(selected: &[String], kind: ModelKind) -> bool {
    let wanted = kind.name().to_lowercase();
    selected
        .iter()
        .any(|name| name.trim().to_lowercase() == wanted)
}
