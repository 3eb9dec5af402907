use super::*;

#[test]
fn query_without_filters_orders_by_name() {
    let query = contacts_query("  ", "");
    assert_eq!(query.search, None);
    assert!(query.equals.is_empty());
    assert_eq!(query.order, Some(("name".to_owned(), true)));
}

#[test]
fn query_combines_search_and_company() {
    let query = contacts_query(" ada ", " Acme ");
    assert_eq!(query.search.as_deref(), Some("ada"));
    assert_eq!(query.equals, vec![("company".to_owned(), "Acme".to_owned())]);
}
