use skema_domain::{Contact, ID};
use std::sync::Mutex;

#[async_trait::async_trait]
pub trait IContactRepo: Send + Sync {
    async fn insert(&self, contact: &Contact) -> anyhow::Result<()>;
    async fn find(&self, contact_id: &ID) -> Option<Contact>;
    async fn find_many(&self, contact_ids: &[ID]) -> Vec<Contact>;
}

pub struct InMemoryContactRepo {
    contacts: Mutex<Vec<Contact>>,
}

impl InMemoryContactRepo {
    pub fn new() -> Self {
        Self {
            contacts: Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryContactRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IContactRepo for InMemoryContactRepo {
    async fn insert(&self, contact: &Contact) -> anyhow::Result<()> {
        self.contacts.lock().unwrap().push(contact.clone());
        Ok(())
    }

    async fn find(&self, contact_id: &ID) -> Option<Contact> {
        self.contacts
            .lock()
            .unwrap()
            .iter()
            .find(|c| &c.id == contact_id)
            .cloned()
    }

    async fn find_many(&self, contact_ids: &[ID]) -> Vec<Contact> {
        self.contacts
            .lock()
            .unwrap()
            .iter()
            .filter(|c| contact_ids.contains(&c.id))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn inserts_and_finds_contacts() {
        let repo = InMemoryContactRepo::new();
        let contact = Contact::new("Ada Lovelace", Some("ada@example.com"));
        repo.insert(&contact).await.unwrap();

        assert_eq!(repo.find(&contact.id).await, Some(contact.clone()));
        assert_eq!(repo.find_many(&[contact.id.clone()]).await.len(), 1);
        assert_eq!(repo.find(&ID::default()).await, None);
    }
}
