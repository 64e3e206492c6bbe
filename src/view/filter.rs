use crate::api::models::{Contact, StatusFilter};

/// Contact-list predicate: status first, then a case-insensitive name match
/// or a literal phone substring.
pub fn matches(contact: &Contact, search: &str, status: StatusFilter) -> bool {
    if !status.matches(contact.status) {
        return false;
    }
    if search.is_empty() {
        return true;
    }
    contact.name.to_lowercase().contains(&search.to_lowercase()) || contact.phone.contains(search)
}

pub fn filter_contacts<'a>(
    contacts: &'a [Contact],
    search: &str,
    status: StatusFilter,
) -> Vec<&'a Contact> {
    contacts
        .iter()
        .filter(|c| matches(c, search, status))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::ContactStatus;

    fn contact(id: &str, name: &str, phone: &str, status: ContactStatus) -> Contact {
        Contact {
            id: id.into(),
            name: name.into(),
            phone: phone.into(),
            last_message: "No messages yet".into(),
            last_message_timestamp: String::new(),
            status,
            avatar: String::new(),
        }
    }

    fn sample() -> Vec<Contact> {
        vec![
            contact("r1", "Bobby Tables", "555-0101", ContactStatus::Active),
            contact("r2", "Alice", "555-0102", ContactStatus::Inactive),
            contact("r3", "Jim BOBson", "555-0103", ContactStatus::Inactive),
            contact("r4", "Carol", "bob-line", ContactStatus::Active),
        ]
    }

    fn ids(list: Vec<&Contact>) -> Vec<&str> {
        list.into_iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn empty_search_and_all_is_identity() {
        let contacts = sample();
        assert_eq!(
            ids(filter_contacts(&contacts, "", StatusFilter::All)),
            ["r1", "r2", "r3", "r4"]
        );
    }

    #[test]
    fn search_matches_name_case_insensitively_or_phone() {
        let contacts = sample();
        assert_eq!(ids(filter_contacts(&contacts, "bob", StatusFilter::All)), ["r1", "r3", "r4"]);
    }

    #[test]
    fn phone_match_is_literal() {
        let contacts = sample();
        assert_eq!(ids(filter_contacts(&contacts, "0102", StatusFilter::All)), ["r2"]);
        assert!(filter_contacts(&contacts, "BOB-LINE", StatusFilter::All).is_empty());
    }

    #[test]
    fn status_and_search_combine() {
        let contacts = sample();
        assert_eq!(ids(filter_contacts(&contacts, "bob", StatusFilter::Inactive)), ["r3"]);
        assert_eq!(ids(filter_contacts(&contacts, "", StatusFilter::Active)), ["r1", "r4"]);
    }
}
