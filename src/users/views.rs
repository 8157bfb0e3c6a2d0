use std::sync::Arc;

use serde_json::{json, Value};

use crate::error::{BridgeError, Result};
use crate::pagination::{Page, PageRequest};
use crate::serializer::FieldSpec;
use crate::store::{User, UserFilter, UserRepository};
use crate::users::serializers::{
    detail_fields, list_fields, validate_create, validate_update, UserDetail, UserListItem,
};
use crate::viewset::{Action, ActionCall, ExtraAction, Payload, ViewSet};

/// CRUD handlers for user accounts, plus `active`, `activate` and `deactivate`.
pub struct UserViewSet {
    repo: Arc<dyn UserRepository>,
    page_size: usize,
}

impl UserViewSet {
    pub fn new(repo: Arc<dyn UserRepository>, page_size: usize) -> Self {
        Self { repo, page_size }
    }

    fn list(&self, call: &ActionCall, filter: UserFilter) -> Result<Payload> {
        let request = PageRequest::from_arguments(&call.arguments, self.page_size);
        let page = list_page(self.repo.as_ref(), &filter, request)?;
        Ok(Payload::ok(serde_json::to_value(page)?))
    }

    fn create(&self, call: &ActionCall) -> Result<Payload> {
        let new_user = validate_create(self.repo.as_ref(), &call.arguments)?;
        let user = self.repo.create_user(&new_user)?;
        Ok(Payload::created(detail(&user)?))
    }

    fn retrieve(&self, id: i64) -> Result<Payload> {
        let user = self.object(id)?;
        Ok(Payload::ok(detail(&user)?))
    }

    fn update(&self, id: i64, call: &ActionCall) -> Result<Payload> {
        self.object(id)?;
        let changes = validate_update(self.repo.as_ref(), id, &call.arguments)?;
        let user = self
            .repo
            .update_user(id, &changes)?
            .ok_or_else(|| BridgeError::not_found("User", id))?;
        Ok(Payload::ok(detail(&user)?))
    }

    fn destroy(&self, id: i64) -> Result<Payload> {
        if !self.repo.delete_user(id)? {
            return Err(BridgeError::not_found("User", id));
        }
        Ok(Payload::Status(204))
    }

    fn set_active(&self, id: i64, is_active: bool) -> Result<Payload> {
        if !self.repo.set_active(id, is_active)? {
            return Err(BridgeError::not_found("User", id));
        }
        let status = if is_active { "user activated" } else { "user deactivated" };
        Ok(Payload::ok(json!({ "status": status })))
    }

    fn object(&self, id: i64) -> Result<User> {
        self.repo
            .get_user(id)?
            .ok_or_else(|| BridgeError::not_found("User", id))
    }
}

impl ViewSet for UserViewSet {
    fn name(&self) -> &str {
        "UserViewSet"
    }

    fn queryset_model(&self) -> Option<&str> {
        Some("User")
    }

    fn extra_actions(&self) -> Vec<ExtraAction> {
        vec![
            ExtraAction::new("activate", true, &["post"]).describe("Activate a user"),
            ExtraAction::new("active", false, &["get"]).describe("Get only active users"),
            ExtraAction::new("deactivate", true, &["post"]).describe("Deactivate a user"),
        ]
    }

    fn serializer_fields(&self, action: &Action) -> Result<Vec<FieldSpec>> {
        Ok(match action {
            Action::List => list_fields(),
            _ => detail_fields(),
        })
    }

    fn handle(&self, call: &ActionCall) -> Result<Payload> {
        match &call.action {
            Action::List => self.list(call, UserFilter::default()),
            Action::Create => self.create(call),
            Action::Retrieve => self.retrieve(pk(call)?),
            Action::Update => self.update(pk(call)?, call),
            Action::Destroy => self.destroy(pk(call)?),
            Action::Extra(name) => match name.as_str() {
                "active" => self.list(call, UserFilter::active()),
                "activate" => self.set_active(pk(call)?, true),
                "deactivate" => self.set_active(pk(call)?, false),
                other => Err(BridgeError::UnsupportedAction(other.to_string())),
            },
        }
    }
}

/// One page of users in the list projection.
pub fn list_page(
    repo: &dyn UserRepository,
    filter: &UserFilter,
    request: PageRequest,
) -> Result<Page<UserListItem>> {
    let count = repo.count_users(filter)?;
    let results = match request.offset() {
        Some(offset) => repo
            .list_users(filter, request.limit(), offset)?
            .iter()
            .map(UserListItem::from)
            .collect(),
        None => Vec::new(),
    };
    Ok(Page::new(results, count, request))
}

fn detail(user: &User) -> Result<Value> {
    Ok(serde_json::to_value(UserDetail::from(user))?)
}

fn pk(call: &ActionCall) -> Result<i64> {
    let raw = call
        .pk
        .as_deref()
        .ok_or_else(|| BridgeError::missing_parameter("id", call.action.as_str()))?;
    parse_id(raw)
}

/// Parses a user id, rejecting anything that is not an integer.
pub fn parse_id(raw: &str) -> Result<i64> {
    raw.trim().parse().map_err(|_| {
        BridgeError::InvalidArgument(format!("Field 'id' expected a number but got '{}'.", raw))
    })
}
