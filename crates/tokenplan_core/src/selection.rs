use crate::ModelDescriptor;

/// Which models to load for one run, after placeholder expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionPlan<'a> {
    /// Models to hand to the tokenizer loader, in config order of selection.
    pub load: Vec<&'a ModelDescriptor>,
    /// Selected models that need authentication and are never loaded.
    pub skipped_auth: Vec<&'a ModelDescriptor>,
    /// Selection tokens that matched neither an index nor a name.
    pub unmatched: Vec<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("no loadable models selected")]
    NothingSelected,
}

/// Resolves user selection tokens (1-based indices or exact names) against the
/// configured models.
///
/// An empty selection, or one that includes the aggregate placeholder, selects
/// every non-placeholder model. The placeholder itself is never part of the plan.
pub fn plan_loads<'a, S: AsRef<str>>(
    models: &'a [ModelDescriptor],
    selection: &[S],
) -> Result<SelectionPlan<'a>, SelectionError> {
    let mut chosen: Vec<usize> = Vec::new();
    let mut unmatched = Vec::new();

    for token in selection.iter().map(|s| s.as_ref().trim()) {
        if token.is_empty() {
            continue;
        }
        match resolve_token(models, token) {
            Some(index) => {
                if !chosen.contains(&index) {
                    chosen.push(index);
                }
            }
            None => unmatched.push(token.to_string()),
        }
    }

    let wants_all = (chosen.is_empty() && unmatched.is_empty())
        || chosen.iter().any(|&i| models[i].is_all_option);
    if wants_all {
        chosen = (0..models.len())
            .filter(|&i| !models[i].is_all_option)
            .collect();
    }

    let mut load = Vec::new();
    let mut skipped_auth = Vec::new();
    for model in chosen.into_iter().map(|i| &models[i]) {
        if model.auth_required {
            skipped_auth.push(model);
        } else {
            load.push(model);
        }
    }

    if load.is_empty() {
        return Err(SelectionError::NothingSelected);
    }

    Ok(SelectionPlan {
        load,
        skipped_auth,
        unmatched,
    })
}

fn resolve_token(models: &[ModelDescriptor], token: &str) -> Option<usize> {
    if let Ok(number) = token.parse::<usize>() {
        return number.checked_sub(1).filter(|&i| i < models.len());
    }
    models.iter().position(|m| m.name == token)
}

#[cfg(test)]
mod tests {
    use super::resolve_token;
    use crate::ModelDescriptor;

    #[test]
    fn index_zero_is_not_a_valid_position() {
        let models = vec![ModelDescriptor::new("a")];
        assert_eq!(resolve_token(&models, "0"), None);
        assert_eq!(resolve_token(&models, "1"), Some(0));
        assert_eq!(resolve_token(&models, "2"), None);
    }
}
