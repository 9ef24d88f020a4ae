//! Data access for groups and their expenses.
//!
//! The balance engine never talks to storage: handlers fetch a group's
//! expenses through [`ExpenseStore`] and pass the plain list on. Which backend
//! sits behind it is decided once, from [`DataSource`] in the settings.
use std::collections::BTreeMap;

use futures::TryStreamExt;
use mongodb::{bson::doc, Client, Collection};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::money::MoneyCents;
use crate::schemas::{Expense, Group, GroupSummary, User};

const GROUPS_COLLECTION: &str = "Groups";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    #[default]
    Mongo,
    Memory,
}

pub enum ExpenseStore {
    Mongo(MongoStore),
    Memory(MemoryStore),
}

impl ExpenseStore {
    pub async fn create_group(&self, id: &str, name: &str) -> Result<(), StoreError> {
        match self {
            Self::Mongo(store) => store.create_group(id, name).await,
            Self::Memory(store) => store.create_group(id, name).await,
        }
    }

    pub async fn add_expense(&self, group_id: &str, expense: Expense) -> Result<(), StoreError> {
        match self {
            Self::Mongo(store) => store.add_expense(group_id, expense).await,
            Self::Memory(store) => store.add_expense(group_id, expense).await,
        }
    }

    pub async fn fetch_expenses(&self, group_id: &str) -> Result<Vec<Expense>, StoreError> {
        match self {
            Self::Mongo(store) => store.fetch_expenses(group_id).await,
            Self::Memory(store) => store.fetch_expenses(group_id).await,
        }
    }

    pub async fn list_groups(&self) -> Result<Vec<GroupSummary>, StoreError> {
        match self {
            Self::Mongo(store) => store.list_groups().await,
            Self::Memory(store) => store.list_groups().await,
        }
    }
}

pub struct MongoStore {
    groups: Collection<Group>,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        tracing::info!(database, "connected to mongodb");
        Ok(Self::from_client(&client, database))
    }

    pub fn from_client(client: &Client, database: &str) -> Self {
        Self {
            groups: client.database(database).collection(GROUPS_COLLECTION),
        }
    }

    async fn create_group(&self, id: &str, name: &str) -> Result<(), StoreError> {
        if self.groups.find_one(doc! { "id": id }, None).await?.is_some() {
            return Err(StoreError::ExistingGroup(id.to_string()));
        }
        let group = Group {
            id: id.to_string(),
            name: name.to_string(),
            expenses: vec![],
        };
        self.groups.insert_one(group, None).await?;
        tracing::debug!(group = id, "group inserted");
        Ok(())
    }

    async fn add_expense(&self, group_id: &str, expense: Expense) -> Result<(), StoreError> {
        let expense = bson::to_bson(&expense)?;
        let result = self
            .groups
            .update_one(
                doc! { "id": group_id },
                doc! { "$push": { "expenses": expense } },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(StoreError::GroupNotFound(group_id.to_string()));
        }
        tracing::debug!(group = group_id, "expense pushed");
        Ok(())
    }

    async fn fetch_expenses(&self, group_id: &str) -> Result<Vec<Expense>, StoreError> {
        match self.groups.find_one(doc! { "id": group_id }, None).await? {
            Some(group) => Ok(group.expenses),
            None => Err(StoreError::GroupNotFound(group_id.to_string())),
        }
    }

    async fn list_groups(&self) -> Result<Vec<GroupSummary>, StoreError> {
        let groups: Vec<Group> = self.groups.find(None, None).await?.try_collect().await?;
        Ok(groups.iter().map(GroupSummary::from).collect())
    }
}

/// In-process store, used for demos and tests.
#[derive(Default)]
pub struct MemoryStore {
    groups: RwLock<BTreeMap<String, Group>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding a single `demo` group with a handful of expenses.
    pub fn with_sample_data() -> Self {
        let alice = User::new("alice", "Alice");
        let bob = User::new("bob", "Bob");
        let carol = User::new("carol", "Carol");
        let everyone = [alice.clone(), bob.clone(), carol.clone()];

        let expenses = vec![
            Expense::split_evenly(MoneyCents::from_units(90), alice.clone(), &everyone)
                .with_title("Groceries")
                .with_category("food"),
            Expense::split_evenly(MoneyCents::new(4_550), bob.clone(), &[alice, bob])
                .with_title("Cinema")
                .with_category("leisure"),
            Expense::split_evenly(MoneyCents::from_units(30), carol, &everyone).with_title("Taxi"),
        ];

        let group = Group {
            id: "demo".to_string(),
            name: "Demo trip".to_string(),
            expenses,
        };
        Self {
            groups: RwLock::new(BTreeMap::from([(group.id.clone(), group)])),
        }
    }

    async fn create_group(&self, id: &str, name: &str) -> Result<(), StoreError> {
        let mut groups = self.groups.write().await;
        if groups.contains_key(id) {
            return Err(StoreError::ExistingGroup(id.to_string()));
        }
        groups.insert(
            id.to_string(),
            Group {
                id: id.to_string(),
                name: name.to_string(),
                expenses: vec![],
            },
        );
        Ok(())
    }

    async fn add_expense(&self, group_id: &str, expense: Expense) -> Result<(), StoreError> {
        let mut groups = self.groups.write().await;
        let group = groups
            .get_mut(group_id)
            .ok_or_else(|| StoreError::GroupNotFound(group_id.to_string()))?;
        group.expenses.push(expense);
        Ok(())
    }

    async fn fetch_expenses(&self, group_id: &str) -> Result<Vec<Expense>, StoreError> {
        let groups = self.groups.read().await;
        groups
            .get(group_id)
            .map(|group| group.expenses.clone())
            .ok_or_else(|| StoreError::GroupNotFound(group_id.to_string()))
    }

    async fn list_groups(&self) -> Result<Vec<GroupSummary>, StoreError> {
        let groups = self.groups.read().await;
        Ok(groups.values().map(GroupSummary::from).collect())
    }
}
