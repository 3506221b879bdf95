//! Translation of query parameters into Qdrant filters.

use qdrant_client::qdrant::{Condition, Filter, PointId};

use crate::payload::{FIELD_HASH, FIELD_USER_ID};
use crate::point::PointKey;

/// Conditions restricting a request to points written by `user_id`.
///
/// An empty user id is treated as no user.
fn user_conditions(user_id: Option<&str>) -> Vec<Condition> {
    user_id
        .filter(|user_id| !user_id.is_empty())
        .map(|user_id| Condition::matches(FIELD_USER_ID, user_id.to_owned()))
        .into_iter()
        .collect()
}

fn point_ids(ids: &[String]) -> Vec<PointId> {
    ids.iter()
        .map(|id| PointKey::from_document_id(id).into())
        .collect()
}

/// Matches points whose id is one of `ids` or whose hash is one of `hashes`.
pub(crate) fn select_filter(ids: &[String], hashes: &[String], user_id: Option<&str>) -> Filter {
    let mut should: Vec<Condition> = hashes
        .iter()
        .map(|hash| Condition::matches(FIELD_HASH, hash.clone()))
        .collect();

    if !ids.is_empty() {
        should.push(Condition::has_id(point_ids(ids)));
    }

    Filter {
        should,
        must: user_conditions(user_id),
        ..Default::default()
    }
}

/// Matches the points stored under `ids`.
pub(crate) fn delete_filter(ids: &[String], user_id: Option<&str>) -> Filter {
    let mut must = vec![Condition::has_id(point_ids(ids))];
    must.extend(user_conditions(user_id));

    Filter::must(must)
}

/// Matches every point of a user, or every point when no user is given.
pub(crate) fn user_filter(user_id: Option<&str>) -> Filter {
    Filter::must(user_conditions(user_id))
}

/// User restriction of a search, if any.
pub(crate) fn search_filter(user_id: Option<&str>) -> Option<Filter> {
    user_id
        .filter(|user_id| !user_id.is_empty())
        .map(|user_id| user_filter(Some(user_id)))
}

#[cfg(test)]
mod tests {
    use qdrant_client::qdrant::condition::ConditionOneOf;
    use qdrant_client::qdrant::r#match::MatchValue;

    use super::*;

    fn keyword(condition: &Condition) -> (String, String) {
        match &condition.condition_one_of {
            Some(ConditionOneOf::Field(field)) => {
                let value = field
                    .r#match
                    .as_ref()
                    .and_then(|m| m.match_value.clone());
                match value {
                    Some(MatchValue::Keyword(k)) => (field.key.clone(), k),
                    other => panic!("expected keyword match, got {other:?}"),
                }
            }
            other => panic!("expected field condition, got {other:?}"),
        }
    }

    fn has_id(condition: &Condition) -> Vec<PointId> {
        match &condition.condition_one_of {
            Some(ConditionOneOf::HasId(has_id)) => has_id.has_id.clone(),
            other => panic!("expected has_id condition, got {other:?}"),
        }
    }

    #[test]
    fn test_select_filter_by_hashes_and_ids() {
        let ids = vec!["a".to_string(), "7".to_string()];
        let hashes = vec!["h1".to_string(), "h2".to_string()];

        let filter = select_filter(&ids, &hashes, None);

        assert!(filter.must.is_empty());
        assert_eq!(filter.should.len(), 3);
        assert_eq!(keyword(&filter.should[0]), ("hash".into(), "h1".into()));
        assert_eq!(keyword(&filter.should[1]), ("hash".into(), "h2".into()));
        assert_eq!(
            has_id(&filter.should[2]),
            vec![
                PointId::from(PointKey::from_document_id("a")),
                PointId::from(7_u64),
            ]
        );
    }

    #[test]
    fn test_select_filter_without_ids_has_no_id_condition() {
        let filter = select_filter(&[], &["h".to_string()], None);

        assert_eq!(filter.should.len(), 1);
        assert_eq!(keyword(&filter.should[0]).0, "hash");
    }

    #[test]
    fn test_user_is_matched_by_value() {
        let filter = select_filter(&["a".to_string()], &[], Some("alice"));

        assert_eq!(filter.must.len(), 1);
        assert_eq!(keyword(&filter.must[0]), ("user_id".into(), "alice".into()));
    }

    #[test]
    fn test_delete_filter() {
        let filter = delete_filter(&["a".to_string()], Some("bob"));

        assert!(filter.should.is_empty());
        assert_eq!(filter.must.len(), 2);
        assert_eq!(has_id(&filter.must[0]).len(), 1);
        assert_eq!(keyword(&filter.must[1]), ("user_id".into(), "bob".into()));
    }

    #[test]
    fn test_user_filter_without_user_matches_everything() {
        let filter = user_filter(None);

        assert!(filter.must.is_empty());
        assert!(filter.should.is_empty());
        assert!(filter.must_not.is_empty());
    }

    #[test]
    fn test_empty_user_is_no_user() {
        assert!(user_filter(Some("")).must.is_empty());
        assert!(search_filter(Some("")).is_none());
    }

    #[test]
    fn test_search_filter() {
        assert!(search_filter(None).is_none());

        let filter = search_filter(Some("carol")).unwrap();
        assert_eq!(keyword(&filter.must[0]), ("user_id".into(), "carol".into()));
    }
}
