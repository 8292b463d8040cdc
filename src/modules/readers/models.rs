use libris_db::{Book, Reader, ReaderId};
use serde::{Deserialize, Serialize};

use crate::catalog::{ReaderSearch, ReaderSort};
use crate::modules::books::models::BookView;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderView {
    pub id: ReaderId,
    pub name: String,
    pub last_name: String,
    pub address: String,
    pub phone_number: String,
}

impl From<&Reader> for ReaderView {
    fn from(reader: &Reader) -> Self {
        Self {
            id: reader.id,
            name: reader.name.clone(),
            last_name: reader.last_name.clone(),
            address: reader.address.clone(),
            phone_number: reader.phone_number.clone(),
        }
    }
}

impl From<Reader> for ReaderView {
    fn from(reader: Reader) -> Self {
        Self::from(&reader)
    }
}

/// Reader with the books they currently hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderDetail {
    #[serde(flatten)]
    pub reader: ReaderView,
    pub books: Vec<BookView>,
}

impl From<(Reader, Vec<Book>)> for ReaderDetail {
    fn from((reader, books): (Reader, Vec<Book>)) -> Self {
        Self {
            reader: reader.into(),
            books: books.into_iter().map(BookView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReader {
    pub name: String,
    pub last_name: String,
    pub address: String,
    pub phone_number: String,
}

impl CreateReader {
    pub fn is_complete(&self) -> bool {
        [&self.name, &self.last_name, &self.address, &self.phone_number]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

/// Partial update; absent or empty fields keep the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateReader {
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
}

impl UpdateReader {
    pub fn apply_to(self, reader: &mut Reader) {
        let fields = [
            (&mut reader.name, self.name),
            (&mut reader.last_name, self.last_name),
            (&mut reader.address, self.address),
            (&mut reader.phone_number, self.phone_number),
        ];
        for (target, value) in fields {
            if let Some(value) = value.filter(|value| !value.is_empty()) {
                *target = value;
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchReadersQuery {
    pub text: Option<String>,
}

impl From<SearchReadersQuery> for ReaderSearch {
    fn from(query: SearchReadersQuery) -> Self {
        Self { text: query.text }
    }
}

/// Boolean sort flags; the first one set wins.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct SortReadersQuery {
    pub sort_by_name_asc: bool,
    pub sort_by_name_desc: bool,
    pub sort_by_last_name_asc: bool,
    pub sort_by_last_name_desc: bool,
}

impl SortReadersQuery {
    pub fn criterion(&self) -> Option<ReaderSort> {
        [
            (self.sort_by_name_asc, ReaderSort::NameAsc),
            (self.sort_by_name_desc, ReaderSort::NameDesc),
            (self.sort_by_last_name_asc, ReaderSort::LastNameAsc),
            (self.sort_by_last_name_desc, ReaderSort::LastNameDesc),
        ]
        .into_iter()
        .find_map(|(set, criterion)| set.then_some(criterion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libris_db::Audit;
    use libris_kernel::IdentityContext;
    use time::OffsetDateTime;

    #[test]
    fn patch_replaces_only_supplied_fields() {
        let audit = Audit::created(&IdentityContext::new("admin"), OffsetDateTime::UNIX_EPOCH);
        let mut reader = Reader::new("Olga", "Petrova", "Main 1", "555", audit);

        UpdateReader {
            address: Some("Main 2".into()),
            phone_number: Some(String::new()),
            ..UpdateReader::default()
        }
        .apply_to(&mut reader);

        assert_eq!(reader.name, "Olga");
        assert_eq!(reader.address, "Main 2");
        assert_eq!(reader.phone_number, "555");
    }

    #[test]
    fn sort_flag_priority() {
        let query = SortReadersQuery {
            sort_by_last_name_desc: true,
            sort_by_name_desc: true,
            ..SortReadersQuery::default()
        };
        assert_eq!(query.criterion(), Some(ReaderSort::NameDesc));
        assert_eq!(SortReadersQuery::default().criterion(), None);
    }

    #[test]
    fn detail_flattens_reader_fields() {
        let audit = Audit::created(&IdentityContext::new("admin"), OffsetDateTime::UNIX_EPOCH);
        let reader = Reader::new("Olga", "Petrova", "Main 1", "555", audit);
        let detail = ReaderDetail::from((reader, vec![]));
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["name"], "Olga");
        assert_eq!(json["books"], serde_json::json!([]));
    }
}
