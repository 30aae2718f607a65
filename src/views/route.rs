use crate::models::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    List,
    New,
    Detail(i64),
    Edit(i64),
    Delete(i64),
}

/// A location inside one entity's screens, e.g. `/exercise/5/delete?page=2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub entity: String,
    pub kind: RouteKind,
    /// Query string including its leading `?`, or empty.
    pub search: String,
}

impl Route {
    pub fn parse(entity: &str, location: &str) -> Option<Self> {
        let (path, search) = split_search(location);
        let mut segments = path.trim_matches('/').split('/');

        if segments.next()? != entity {
            return None;
        }

        let kind = match (segments.next(), segments.next(), segments.next()) {
            (None, _, _) | (Some(""), None, _) => RouteKind::List,
            (Some("new"), None, _) => RouteKind::New,
            (Some(id), None, _) => RouteKind::Detail(id.parse().ok()?),
            (Some(id), Some("edit"), None) => RouteKind::Edit(id.parse().ok()?),
            (Some(id), Some("delete"), None) => RouteKind::Delete(id.parse().ok()?),
            _ => return None,
        };

        Some(Self {
            entity: entity.to_string(),
            kind,
            search,
        })
    }

    pub fn for_entity<E: Entity>(kind: RouteKind) -> Self {
        Self {
            entity: E::NAME.to_string(),
            kind,
            search: String::new(),
        }
    }

    pub fn with_search(mut self, search: &str) -> Self {
        self.search = normalize_search(search);
        self
    }

    pub fn path(&self) -> String {
        let base = match self.kind {
            RouteKind::List => format!("/{}", self.entity),
            RouteKind::New => format!("/{}/new", self.entity),
            RouteKind::Detail(id) => format!("/{}/{}", self.entity, id),
            RouteKind::Edit(id) => format!("/{}/{}/edit", self.entity, id),
            RouteKind::Delete(id) => format!("/{}/{}/delete", self.entity, id),
        };
        format!("{}{}", base, self.search)
    }

    pub fn params(&self) -> RouteParams {
        let id = match self.kind {
            RouteKind::Detail(id) | RouteKind::Edit(id) | RouteKind::Delete(id) => Some(id),
            RouteKind::List | RouteKind::New => None,
        };
        RouteParams {
            id,
            search: self.search.clone(),
        }
    }
}

/// What a mounted view reads from its route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    pub id: Option<i64>,
    pub search: String,
}

impl RouteParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: i64) -> Self {
        Self {
            id: Some(id),
            search: String::new(),
        }
    }

    pub fn search(mut self, search: &str) -> Self {
        self.search = normalize_search(search);
        self
    }

    /// The entity's list location, keeping the current query string.
    pub fn list_location<E: Entity>(&self) -> String {
        format!("{}{}", E::list_path(), self.search)
    }
}

fn split_search(location: &str) -> (&str, String) {
    match location.split_once('?') {
        Some((path, query)) => (path, normalize_search(query)),
        None => (location, String::new()),
    }
}

fn normalize_search(search: &str) -> String {
    let query = search.trim_start_matches('?');
    if query.is_empty() {
        String::new()
    } else {
        format!("?{}", query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Exercise;

    #[test]
    fn parses_every_screen() {
        let cases = [
            ("/exercise", RouteKind::List),
            ("/exercise/new", RouteKind::New),
            ("/exercise/5", RouteKind::Detail(5)),
            ("/exercise/5/edit", RouteKind::Edit(5)),
            ("/exercise/5/delete", RouteKind::Delete(5)),
        ];
        for (location, kind) in cases {
            let route = Route::parse("exercise", location).unwrap();
            assert_eq!(route.kind, kind, "{}", location);
            assert_eq!(route.path(), location);
        }
    }

    #[test]
    fn keeps_query_string() {
        let route = Route::parse("exercise", "/exercise/5/delete?page=2&sort=id,asc").unwrap();
        assert_eq!(route.search, "?page=2&sort=id,asc");
        assert_eq!(route.params().id, Some(5));
        assert_eq!(route.params().list_location::<Exercise>(), "/exercise?page=2&sort=id,asc");
    }

    #[test]
    fn rejects_foreign_or_malformed_paths() {
        assert!(Route::parse("exercise", "/course/5").is_none());
        assert!(Route::parse("exercise", "/exercise/abc").is_none());
        assert!(Route::parse("exercise", "/exercise/5/archive").is_none());
    }
}
