//! Fake Strapi server for testing
//!
//! An in-memory Strapi stand-in mounted on a wiremock server through a custom
//! responder. It understands the subset of the REST API the crate uses:
//! `filters[...]` with `$eq`, `$in` and `$containsi`, one level of relation
//! filters, `populate[i]`, pagination, and POST / PUT / DELETE by documentId.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use serde_json::{json, Map, Value};
use wiremock::{matchers::any, Mock, MockServer, Request, Respond, ResponseTemplate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cardinality {
    One,
    Many,
}

fn relation_target(collection: &str, field: &str) -> Option<(&'static str, Cardinality)> {
    match (collection, field) {
        ("instructors", "user") => Some(("users", Cardinality::One)),
        ("instructor-groups", "owner") => Some(("users", Cardinality::One)),
        ("instructor-groups", "instructors") => Some(("instructors", Cardinality::Many)),
        ("instructor-invitations", "from_user") => Some(("users", Cardinality::One)),
        ("instructor-invitations", "to_instructor") => Some(("instructors", Cardinality::One)),
        ("instructor-invitations", "instructor_group") => Some(("instructor-groups", Cardinality::One)),
        ("post-interactions", "user") => Some(("users", Cardinality::One)),
        ("post-interactions", "post") => Some(("posts", Cardinality::One)),
        ("users", "subscription") => Some(("subscriptions", Cardinality::One)),
        _ => None,
    }
}

/// Identifiers of a seeded record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seeded {
    pub id: u64,
    pub document_id: String,
}

#[derive(Default)]
struct State {
    collections: HashMap<String, Vec<Map<String, Value>>>,
    next_id: HashMap<String, u64>,
    clock: i64,
    requests: Vec<(String, String)>,
    touch_on_path_reads: HashMap<(String, u64), u32>,
    failures: HashMap<(String, String), u16>,
    bare_relations: bool,
}

/// Shared handle to the fake; clones see the same data
#[derive(Clone, Default)]
pub struct FakeStrapi {
    state: Arc<Mutex<State>>,
}

impl FakeStrapi {
    /// Start a wiremock server answering every request with this fake
    pub async fn start() -> (MockServer, FakeStrapi) {
        let server = MockServer::start().await;
        let fake = FakeStrapi::default();
        Mock::given(any())
            .respond_with(fake.clone())
            .mount(&server)
            .await;
        (server, fake)
    }

    /// Insert a raw record, assigning id, documentId and timestamps
    pub fn insert(&self, collection: &str, fields: Value) -> Seeded {
        let mut state = self.state.lock().unwrap();
        let mut record = match fields {
            Value::Object(map) => map,
            other => panic!("record must be an object, got {}", other),
        };
        state.assign_identity(collection, &mut record)
    }

    pub fn seed_user(&self, username: &str, group_limit: Option<u32>, member_limit: Option<u32>) -> Seeded {
        self.insert(
            "users",
            json!({
                "username": username,
                "email": format!("{}@example.org", username),
                "instructor_group_limit": group_limit,
                "user_group_member_limit": member_limit,
            }),
        )
    }

    pub fn seed_subscription(&self, fields: Value) -> Seeded {
        self.insert("subscriptions", fields)
    }

    pub fn seed_instructor(&self, user_id: u64, name: &str) -> Seeded {
        self.insert(
            "instructors",
            json!({
                "name": name,
                "bio": format!("{} teaches mathematics", name),
                "is_verified": true,
                "is_active": true,
                "user": user_id,
            }),
        )
    }

    pub fn seed_group(&self, owner_id: u64, name: &str, members: &[u64]) -> Seeded {
        self.insert(
            "instructor-groups",
            json!({
                "name": name,
                "owner": owner_id,
                "instructors": members,
            }),
        )
    }

    pub fn seed_invitation(&self, from_user: u64, to_instructor: u64, group: u64, status: &str, invited_at: &str) -> Seeded {
        self.insert(
            "instructor-invitations",
            json!({
                "from_user": from_user,
                "to_instructor": to_instructor,
                "instructor_group": group,
                "invitation_status": status,
                "message": "Join us",
                "invited_at": invited_at,
                "read": false,
            }),
        )
    }

    pub fn seed_post(&self, title: &str) -> Seeded {
        self.insert("posts", json!({ "title": title }))
    }

    /// Raw stored records of a collection
    pub fn records(&self, collection: &str) -> Vec<Value> {
        let state = self.state.lock().unwrap();
        state
            .collections
            .get(collection)
            .map(|records| records.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    /// Raw stored record by numeric id
    pub fn record(&self, collection: &str, id: u64) -> Option<Value> {
        self.records(collection)
            .into_iter()
            .find(|r| r.get("id").and_then(Value::as_u64) == Some(id))
    }

    /// Stored member ids of a group
    pub fn group_members(&self, group_id: u64) -> Vec<u64> {
        self.record("instructor-groups", group_id)
            .and_then(|g| g.get("instructors").cloned())
            .and_then(|v| v.as_array().cloned())
            .unwrap_or_default()
            .iter()
            .filter_map(Value::as_u64)
            .collect()
    }

    /// Number of received requests with this method whose path starts with the prefix
    pub fn request_count(&self, method: &str, path_prefix: &str) -> usize {
        let state = self.state.lock().unwrap();
        state
            .requests
            .iter()
            .filter(|(m, p)| m == method && p.starts_with(path_prefix))
            .count()
    }

    /// Simulate another writer: the next `times` path reads of the record
    /// observe a fresh `updatedAt`
    pub fn touch_on_path_reads(&self, collection: &str, id: u64, times: u32) {
        let mut state = self.state.lock().unwrap();
        state.touch_on_path_reads.insert((collection.to_string(), id), times);
    }

    /// Answer every `method` request on `collection` with `status`
    pub fn fail_on(&self, method: &str, collection: &str, status: u16) {
        let mut state = self.state.lock().unwrap();
        state.failures.insert((method.to_string(), collection.to_string()), status);
    }

    /// Return relations as bare ids even when populated
    pub fn set_bare_relations(&self, bare: bool) {
        self.state.lock().unwrap().bare_relations = bare;
    }
}

impl Respond for FakeStrapi {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut state = self.state.lock().unwrap();
        state.handle(request)
    }
}

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "data": null,
        "error": {"status": 404, "name": "NotFoundError", "message": "Not Found"}
    }))
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn linked_ids(value: Option<&Value>) -> Vec<u64> {
    match value {
        Some(Value::Number(n)) => n.as_u64().into_iter().collect(),
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_u64).collect(),
        _ => Vec::new(),
    }
}

/// `filters[a][b][$op][i]` -> `["a", "b", "$op", "i"]`
fn bracket_segments(key: &str) -> Vec<String> {
    key.trim_start_matches("filters")
        .split(']')
        .map(|s| s.trim_start_matches('[').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

struct Condition {
    path: Vec<String>,
    op: String,
    values: Vec<String>,
}

fn parse_conditions(params: &[(String, String)]) -> Vec<Condition> {
    let mut conditions: Vec<Condition> = Vec::new();
    for (key, value) in params.iter().filter(|(k, _)| k.starts_with("filters[")) {
        let segments = bracket_segments(key);
        let Some(op_index) = segments.iter().position(|s| s.starts_with('$')) else {
            continue;
        };
        let path = segments[..op_index].to_vec();
        let op = segments[op_index].clone();

        match conditions.iter_mut().find(|c| c.path == path && c.op == op) {
            Some(existing) => existing.values.push(value.clone()),
            None => conditions.push(Condition { path, op, values: vec![value.clone()] }),
        }
    }
    conditions
}

impl State {
    fn tick(&mut self) -> String {
        self.clock += 1;
        let base: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (base + Duration::seconds(self.clock)).to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn assign_identity(&mut self, collection: &str, record: &mut Map<String, Value>) -> Seeded {
        let next = self.next_id.entry(collection.to_string()).or_insert(0);
        *next += 1;
        let id = *next;
        let document_id = format!("d{}", uuid::Uuid::new_v4().simple());
        let now = self.tick();

        record.insert("id".to_string(), json!(id));
        record.insert("documentId".to_string(), json!(document_id));
        record.insert("createdAt".to_string(), json!(now));
        record.insert("updatedAt".to_string(), json!(now));

        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(record.clone());

        Seeded { id, document_id }
    }

    fn find_by_id(&self, collection: &str, id: u64) -> Option<&Map<String, Value>> {
        self.collections
            .get(collection)?
            .iter()
            .find(|r| r.get("id").and_then(Value::as_u64) == Some(id))
    }

    fn position_by_document(&self, collection: &str, document_id: &str) -> Option<usize> {
        self.collections
            .get(collection)?
            .iter()
            .position(|r| r.get("documentId").and_then(Value::as_str) == Some(document_id))
    }

    fn handle(&mut self, request: &Request) -> ResponseTemplate {
        let method = request.method.as_str().to_uppercase();
        let path = request.url.path().to_string();
        self.requests.push((method.clone(), path.clone()));

        if path == "/_health" {
            return ResponseTemplate::new(204);
        }

        let segments: Vec<String> = path
            .trim_start_matches('/')
            .split('/')
            .map(str::to_string)
            .collect();
        if segments.len() < 2 || segments[0] != "api" {
            return not_found();
        }
        let collection = segments[1].clone();
        let document_id = segments.get(2).cloned();

        if let Some(status) = self.failures.get(&(method.clone(), collection.clone())) {
            return ResponseTemplate::new(*status).set_body_json(json!({
                "data": null,
                "error": {"status": status, "name": "ApplicationError", "message": "Injected failure"}
            }));
        }

        let params: Vec<(String, String)> = request
            .url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let populate: Vec<String> = params
            .iter()
            .filter(|(k, _)| k.starts_with("populate"))
            .map(|(_, v)| v.clone())
            .collect();

        match (method.as_str(), document_id) {
            ("GET", None) => self.list(&collection, &params, &populate),
            ("GET", Some(doc)) => self.get_one(&collection, &doc, &populate),
            ("POST", None) => self.create(&collection, &request.body, &populate),
            ("PUT", Some(doc)) => self.update(&collection, &doc, &request.body, &populate),
            ("DELETE", Some(doc)) => self.delete(&collection, &doc),
            _ => ResponseTemplate::new(405),
        }
    }

    fn values_at(&self, collection: &str, record: &Map<String, Value>, path: &[String]) -> Vec<String> {
        match path {
            [field] => match relation_target(collection, field) {
                Some(_) => linked_ids(record.get(field)).iter().map(u64::to_string).collect(),
                None => record.get(field).and_then(scalar).into_iter().collect(),
            },
            [field, key] => match relation_target(collection, field) {
                Some((target, _)) => linked_ids(record.get(field))
                    .into_iter()
                    .filter_map(|id| self.find_by_id(target, id))
                    .filter_map(|linked| linked.get(key).and_then(scalar))
                    .collect(),
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    fn matches(&self, collection: &str, record: &Map<String, Value>, conditions: &[Condition]) -> bool {
        conditions.iter().all(|condition| {
            let values = self.values_at(collection, record, &condition.path);
            match condition.op.as_str() {
                "$eq" => values.iter().any(|v| condition.values.contains(v)),
                "$in" => values.iter().any(|v| condition.values.contains(v)),
                "$containsi" => {
                    let needle = condition.values[0].to_lowercase();
                    values.iter().any(|v| v.to_lowercase().contains(&needle))
                }
                _ => false,
            }
        })
    }

    fn render(&self, collection: &str, record: &Map<String, Value>, populate: &[String]) -> Value {
        let mut rendered = Map::new();
        for (field, value) in record {
            match relation_target(collection, field) {
                None => {
                    rendered.insert(field.clone(), value.clone());
                }
                Some(_) if self.bare_relations && populate.contains(field) => {
                    rendered.insert(field.clone(), value.clone());
                }
                Some((target, cardinality)) if populate.contains(field) => {
                    let linked: Vec<Value> = linked_ids(Some(value))
                        .into_iter()
                        .filter_map(|id| self.find_by_id(target, id))
                        .map(|r| self.render(target, r, &[]))
                        .collect();
                    let embedded = match cardinality {
                        Cardinality::Many => Value::Array(linked),
                        Cardinality::One => linked.into_iter().next().unwrap_or(Value::Null),
                    };
                    rendered.insert(field.clone(), embedded);
                }
                Some(_) => {}
            }
        }
        Value::Object(rendered)
    }

    fn list(&mut self, collection: &str, params: &[(String, String)], populate: &[String]) -> ResponseTemplate {
        let conditions = parse_conditions(params);
        let matching: Vec<Value> = self
            .collections
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| self.matches(collection, r, &conditions))
                    .map(|r| self.render(collection, r, populate))
                    .collect()
            })
            .unwrap_or_default();

        if collection == "users" {
            return ResponseTemplate::new(200).set_body_json(Value::Array(matching));
        }

        let param = |name: &str, default: usize| {
            params
                .iter()
                .find(|(k, _)| k == name)
                .and_then(|(_, v)| v.parse::<usize>().ok())
                .unwrap_or(default)
        };
        let page = param("pagination[page]", 1).max(1);
        let page_size = param("pagination[pageSize]", 25).max(1);
        let total = matching.len();
        let page_count = (total + page_size - 1) / page_size;
        let data: Vec<Value> = matching
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect();

        ResponseTemplate::new(200).set_body_json(json!({
            "data": data,
            "meta": {"pagination": {
                "page": page,
                "pageSize": page_size,
                "pageCount": page_count,
                "total": total
            }}
        }))
    }

    fn get_one(&mut self, collection: &str, document_id: &str, populate: &[String]) -> ResponseTemplate {
        let Some(position) = self.position_by_document(collection, document_id) else {
            return not_found();
        };

        let id = self.collections[collection][position]
            .get("id")
            .and_then(Value::as_u64)
            .unwrap_or_default();
        let touched = match self.touch_on_path_reads.get_mut(&(collection.to_string(), id)) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        };
        if touched {
            let now = self.tick();
            if let Some(records) = self.collections.get_mut(collection) {
                records[position].insert("updatedAt".to_string(), json!(now));
            }
        }

        let record = self.collections[collection][position].clone();
        ResponseTemplate::new(200).set_body_json(json!({
            "data": self.render(collection, &record, populate),
            "meta": {}
        }))
    }

    fn create(&mut self, collection: &str, body: &[u8], populate: &[String]) -> ResponseTemplate {
        let data = match serde_json::from_slice::<Value>(body).ok().and_then(|b| b.get("data").cloned()) {
            Some(Value::Object(map)) => map,
            _ => return ResponseTemplate::new(400),
        };

        let mut record = data;
        let seeded = self.assign_identity(collection, &mut record);
        let stored = self
            .find_by_id(collection, seeded.id)
            .cloned()
            .unwrap_or(record);

        ResponseTemplate::new(201).set_body_json(json!({
            "data": self.render(collection, &stored, populate),
            "meta": {}
        }))
    }

    fn update(&mut self, collection: &str, document_id: &str, body: &[u8], populate: &[String]) -> ResponseTemplate {
        let data = match serde_json::from_slice::<Value>(body).ok().and_then(|b| b.get("data").cloned()) {
            Some(Value::Object(map)) => map,
            _ => return ResponseTemplate::new(400),
        };
        let Some(position) = self.position_by_document(collection, document_id) else {
            return not_found();
        };

        let now = self.tick();
        let records = self.collections.get_mut(collection).expect("collection exists");
        for (field, value) in data {
            records[position].insert(field, value);
        }
        records[position].insert("updatedAt".to_string(), json!(now));

        let record = records[position].clone();
        ResponseTemplate::new(200).set_body_json(json!({
            "data": self.render(collection, &record, populate),
            "meta": {}
        }))
    }

    fn delete(&mut self, collection: &str, document_id: &str) -> ResponseTemplate {
        let Some(position) = self.position_by_document(collection, document_id) else {
            return not_found();
        };
        if let Some(records) = self.collections.get_mut(collection) {
            records.remove(position);
        }
        ResponseTemplate::new(204)
    }
}
