//! Integration tests for access resolution, visibility and administration.
//!
//! Every test builds a fresh in-memory world:
//! - a `superadmin` role, an `admin` (group admin) role and content roles
//! - actors registered through the directory
//! - groups created by a global admin

use std::sync::Arc;

use bulletin_access::{
    AccessResolver, ActorDirectory, CoreError, DenialReason, GroupAdministration, GroupUpdate, Guarded, NewGroup,
    RoleCatalog, VisibilityResolver,
};
use bulletin_org::ActorProfile;
use bulletin_rbac::{Action, Module, PermissionMatrix, PolicyConfig, Role};
use bulletin_store::{AccessConfig, Collection, Document, DocumentStore, Filter, HasAccessConfig, MemoryStore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimal access-controlled resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Notice {
    id: Uuid,
    title: String,
    access_config: AccessConfig,
}

impl Notice {
    fn new(title: &str, access_config: AccessConfig) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: title.to_string(),
            access_config,
        }
    }
}

impl Document for Notice {
    const COLLECTION: Collection = Collection::Cards;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl HasAccessConfig for Notice {
    fn access_config(&self) -> &AccessConfig {
        &self.access_config
    }
}

impl Guarded for Notice {
    const MODULE: Module = Module::CardManagement;
}

/// Test fixture wiring every service over one store.
struct World {
    store: Arc<MemoryStore>,
    resolver: AccessResolver<MemoryStore>,
    visibility: VisibilityResolver<MemoryStore>,
    groups: GroupAdministration<MemoryStore>,
    roles: RoleCatalog<MemoryStore>,
    actors: ActorDirectory<MemoryStore>,
    root: Uuid,
    superadmin: Role,
    admin: Role,
    creator: Role,
    reader: Role,
}

impl World {
    async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let resolver = AccessResolver::from_store(store.clone(), Arc::new(PolicyConfig::default()));

        let superadmin = Role::new("superadmin");
        let admin = Role::new("admin");
        let creator = Role::new("creator").with_permission(Module::CardManagement, [Action::Create, Action::Read]);
        let reader = Role::new("reader").with_permission(Module::CardManagement, [Action::Read]);
        for role in [&superadmin, &admin, &creator, &reader] {
            store.insert(role).await.unwrap();
        }

        let actors = ActorDirectory::new(resolver.clone());
        let root = actors.register("idp|root", ActorProfile::default()).await.unwrap().id;

        // Bootstrap: the first global admin is seeded directly.
        let ops = bulletin_org::Group::new("Operations", root)
            .with_member(root, superadmin.id)
            .unwrap();
        store.insert(&ops).await.unwrap();

        Self {
            visibility: VisibilityResolver::new(resolver.clone()),
            groups: GroupAdministration::new(resolver.clone()),
            roles: RoleCatalog::new(resolver.clone()),
            actors,
            resolver,
            store,
            root,
            superadmin,
            admin,
            creator,
            reader,
        }
    }

    async fn actor(&self, name: &str) -> Uuid {
        self.actors
            .register(&format!("idp|{name}"), ActorProfile::default())
            .await
            .unwrap()
            .id
    }

    async fn group(&self, name: &str) -> Uuid {
        self.groups
            .create_group(
                self.root,
                NewGroup {
                    group_name: name.to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .id
    }

    async fn join(&self, group_id: Uuid, actor_id: Uuid, role: &Role) {
        self.groups
            .add_member(self.root, group_id, actor_id, role.id)
            .await
            .unwrap();
    }
}

// ============================================================================
// Access resolution
// ============================================================================

#[tokio::test]
async fn test_global_admin_is_allowed_everywhere() {
    let w = World::new().await;
    let unrelated = w.group("Unrelated").await;

    for module in Module::all() {
        for action in Action::all() {
            assert!(w
                .resolver
                .authorize(w.root, module, action, &[unrelated, Uuid::now_v7()])
                .await
                .unwrap());
        }
    }
}

#[tokio::test]
async fn test_multi_group_write_requires_every_group() {
    let w = World::new().await;
    let (g1, g2) = (w.group("North").await, w.group("South").await);
    let alice = w.actor("alice").await;
    w.join(g1, alice, &w.creator).await;
    w.join(g2, alice, &w.reader).await;

    assert!(w
        .resolver
        .authorize(alice, Module::CardManagement, Action::Create, &[g1])
        .await
        .unwrap());

    let err = w
        .resolver
        .require(alice, Module::CardManagement, Action::Create, &[g1, g2])
        .await
        .unwrap_err();
    let denial = err.denial().unwrap();
    assert_eq!(denial.group_id, Some(g2));
    assert_eq!(denial.module, Module::CardManagement);
    assert_eq!(denial.action, Action::Create);
    assert_eq!(denial.reason, DenialReason::MissingPermission);
}

#[tokio::test]
async fn test_non_member_is_denied_for_group() {
    let w = World::new().await;
    let g = w.group("North").await;
    let bob = w.actor("bob").await;

    let err = w
        .resolver
        .require(bob, Module::CardManagement, Action::Read, &[g])
        .await
        .unwrap_err();
    assert_eq!(err.denial().map(|d| d.reason), Some(DenialReason::NoRoleInGroup));
}

#[tokio::test]
async fn test_inactive_actor_is_denied_everywhere() {
    let w = World::new().await;
    let g = w.group("North").await;
    let carol = w.actor("carol").await;
    w.join(g, carol, &w.creator).await;

    w.actors.set_active(w.root, carol, false).await.unwrap();

    let err = w
        .resolver
        .require(carol, Module::CardManagement, Action::Create, &[g])
        .await
        .unwrap_err();
    assert_eq!(err.denial().map(|d| d.reason), Some(DenialReason::InactiveActor));

    let err = w
        .visibility
        .accessible_resources::<Notice>(carol, &Filter::All)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Forbidden(_)));
}

// ============================================================================
// Visibility
// ============================================================================

#[tokio::test]
async fn test_visibility_public_and_restricted() {
    let w = World::new().await;
    let (g1, g2) = (w.group("North").await, w.group("South").await);
    let alice = w.actor("alice").await;
    let outsider = w.actor("outsider").await;
    w.join(g1, alice, &w.reader).await;

    let public = Notice::new("public", AccessConfig::public());
    let north = Notice::new("north", AccessConfig::restricted([g1]));
    let both = Notice::new("both", AccessConfig::restricted([g2, g1]));
    let south = Notice::new("south", AccessConfig::restricted([g2]));
    for n in [&public, &north, &both, &south] {
        w.store.insert(n).await.unwrap();
    }

    let seen: Vec<Notice> = w.visibility.accessible_resources(alice, &Filter::All).await.unwrap();
    let mut titles: Vec<&str> = seen.iter().map(|n| n.title.as_str()).collect();
    titles.sort_unstable();
    assert_eq!(titles, vec!["both", "north", "public"]);

    let seen: Vec<Notice> = w.visibility.accessible_resources(outsider, &Filter::All).await.unwrap();
    assert_eq!(seen, vec![public.clone()]);

    let seen: Vec<Notice> = w.visibility.accessible_resources(w.root, &Filter::All).await.unwrap();
    assert_eq!(seen.len(), 4);
}

#[tokio::test]
async fn test_visibility_applies_extra_filters_and_get_by_id() {
    let w = World::new().await;
    let g = w.group("North").await;
    let alice = w.actor("alice").await;
    let outsider = w.actor("outsider").await;
    w.join(g, alice, &w.reader).await;

    let a = Notice::new("drought", AccessConfig::restricted([g]));
    let b = Notice::new("flood", AccessConfig::public());
    w.store.insert(&a).await.unwrap();
    w.store.insert(&b).await.unwrap();

    let seen: Vec<Notice> = w
        .visibility
        .accessible_resources(alice, &Filter::contains_text("title", "DROUGHT"))
        .await
        .unwrap();
    assert_eq!(seen, vec![a.clone()]);

    assert_eq!(w.visibility.get_visible::<Notice>(alice, a.id).await.unwrap(), a);
    let err = w.visibility.get_visible::<Notice>(outsider, a.id).await.unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");

    assert!(w.visibility.can_see(outsider, &b).await.unwrap());
    assert!(!w.visibility.can_see(outsider, &a).await.unwrap());
}

#[tokio::test]
async fn test_public_resource_with_group_list_listed_once() {
    let w = World::new().await;
    let g = w.group("North").await;
    let alice = w.actor("alice").await;
    w.join(g, alice, &w.reader).await;

    // Public with a stray group list: matched by the public query only.
    let stray = Notice::new(
        "stray",
        AccessConfig {
            access_type: bulletin_store::AccessType::Public,
            allowed_groups: vec![g],
        },
    );
    w.store.insert(&stray).await.unwrap();

    let seen: Vec<Notice> = w.visibility.accessible_resources(alice, &Filter::All).await.unwrap();
    assert_eq!(seen.len(), 1);
}

// ============================================================================
// Group administration
// ============================================================================

#[tokio::test]
async fn test_only_global_admin_creates_groups() {
    let w = World::new().await;
    let alice = w.actor("alice").await;

    let err = w
        .groups
        .create_group(
            alice,
            NewGroup {
                group_name: "Rogue".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.denial().map(|d| d.reason), Some(DenialReason::GlobalAdminRequired));

    let group = w
        .groups
        .create_group(
            w.root,
            NewGroup {
                group_name: " Andean ".to_string(),
                description: None,
                country: Some("co".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(group.group_name, "Andean");
    assert_eq!(group.country.as_deref(), Some("CO"));
    assert_eq!(w.groups.groups_by_country("Co").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_membership_mutations() {
    let w = World::new().await;
    let g = w.group("North").await;
    let alice = w.actor("alice").await;

    w.groups.add_member(w.root, g, alice, w.reader.id).await.unwrap();

    let err = w.groups.add_member(w.root, g, alice, w.creator.id).await.unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));

    let updated = w
        .groups
        .update_member_role(w.root, g, alice, w.creator.id)
        .await
        .unwrap();
    assert_eq!(updated.role_of(alice), Some(w.creator.id));
    assert_eq!(w.resolver.members().role_of(alice, g).await.unwrap(), Some(w.creator.id));
    assert!(w.groups.has_role_in_group(g, alice, w.creator.id).await.unwrap());

    w.groups.remove_member(w.root, g, alice).await.unwrap();
    let err = w.groups.remove_member(w.root, g, alice).await.unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");
    assert!(w.groups.list_members(g).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_mutation_refreshes_audit_log() {
    let w = World::new().await;
    let g = w.group("North").await;
    let alice = w.actor("alice").await;

    let before = w.groups.group(g).await.unwrap();
    let after = w.groups.add_member(w.root, g, alice, w.reader.id).await.unwrap();
    assert_eq!(after.log.creator_user_id, before.log.creator_user_id);
    assert_eq!(after.log.created_at, before.log.created_at);
    assert_eq!(after.log.updater_user_id, Some(w.root));
}

#[tokio::test]
async fn test_group_admin_manages_own_group_only() {
    let w = World::new().await;
    let (g1, g2) = (w.group("North").await, w.group("South").await);
    let boss = w.actor("boss").await;
    let alice = w.actor("alice").await;
    w.join(g1, boss, &w.admin).await;

    w.groups.add_member(boss, g1, alice, w.reader.id).await.unwrap();
    w.groups
        .update_group(
            boss,
            g1,
            GroupUpdate {
                description: Some("Northern office".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = w.groups.add_member(boss, g2, alice, w.reader.id).await.unwrap_err();
    assert!(matches!(err, CoreError::Forbidden(_)));
}

#[tokio::test]
async fn test_access_control_permission_allows_membership_changes() {
    let w = World::new().await;
    let g = w.group("North").await;
    let hr = Role::new("hr").with_permission(Module::AccessControl, [Action::Create]);
    w.store.insert(&hr).await.unwrap();
    let clerk = w.actor("clerk").await;
    let alice = w.actor("alice").await;
    w.join(g, clerk, &hr).await;

    w.groups.add_member(clerk, g, alice, w.reader.id).await.unwrap();

    let err = w.groups.remove_member(clerk, g, alice).await.unwrap_err();
    let denial = err.denial().unwrap();
    assert_eq!(denial.action, Action::Delete);
    assert_eq!(denial.group_id, Some(g));
}

#[tokio::test]
async fn test_only_global_admin_assigns_global_admin_role() {
    let w = World::new().await;
    let g = w.group("North").await;
    let boss = w.actor("boss").await;
    let alice = w.actor("alice").await;
    w.join(g, boss, &w.admin).await;
    w.join(g, alice, &w.reader).await;

    let err = w
        .groups
        .update_member_role(boss, g, alice, w.superadmin.id)
        .await
        .unwrap_err();
    assert_eq!(err.denial().map(|d| d.reason), Some(DenialReason::GlobalAdminRequired));

    let newcomer = w.actor("newcomer").await;
    let err = w
        .groups
        .add_member(boss, g, newcomer, w.superadmin.id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Forbidden(_)));

    w.groups
        .update_member_role(w.root, g, alice, w.superadmin.id)
        .await
        .unwrap();
    assert!(w.resolver.is_global_admin(alice).await.unwrap());
}

#[tokio::test]
async fn test_missing_references() {
    let w = World::new().await;
    let g = w.group("North").await;
    let alice = w.actor("alice").await;

    let err = w.groups.add_member(w.root, g, alice, Uuid::now_v7()).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { ref kind, .. } if kind == "roles"));

    let err = w
        .groups
        .add_member(w.root, g, Uuid::now_v7(), w.reader.id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { ref kind, .. } if kind == "users"));

    let err = w
        .groups
        .add_member(w.root, Uuid::now_v7(), alice, w.reader.id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { ref kind, .. } if kind == "groups"));
}

#[tokio::test]
async fn test_only_global_admin_deletes_groups() {
    let w = World::new().await;
    let g = w.group("North").await;
    let boss = w.actor("boss").await;
    w.join(g, boss, &w.admin).await;

    let err = w.groups.delete_group(boss, g).await.unwrap_err();
    assert_eq!(err.denial().map(|d| d.reason), Some(DenialReason::GlobalAdminRequired));
    w.groups.group(g).await.unwrap();

    w.groups.delete_group(w.root, g).await.unwrap();
    let err = w.groups.group(g).await.unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");

    let err = w.groups.delete_group(w.root, g).await.unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");
}

#[tokio::test]
async fn test_memberships_of_actor() {
    let w = World::new().await;
    let (g1, g2) = (w.group("North").await, w.group("South").await);
    let alice = w.actor("alice").await;
    w.join(g1, alice, &w.reader).await;
    w.join(g2, alice, &w.creator).await;

    let mut memberships = w.groups.memberships_of(alice).await.unwrap();
    memberships.sort_by(|a, b| a.group_name.cmp(&b.group_name));
    assert_eq!(memberships.len(), 2);
    assert_eq!(memberships[0].group_name, "North");
    assert_eq!(memberships[0].role_id, w.reader.id);
    assert_eq!(memberships[1].group_id, g2);
}

// ============================================================================
// Roles and actors
// ============================================================================

#[tokio::test]
async fn test_role_catalog_hides_global_admin_roles() {
    let w = World::new().await;
    let alice = w.actor("alice").await;

    let names = |roles: Vec<Role>| roles.into_iter().map(|r| r.name).collect::<Vec<_>>();

    let visible = names(w.roles.list_roles(alice).await.unwrap());
    assert!(!visible.contains(&"superadmin".to_string()));
    assert!(visible.contains(&"admin".to_string()));

    let visible = names(w.roles.list_roles(w.root).await.unwrap());
    assert!(visible.contains(&"superadmin".to_string()));

    let err = w.roles.get_role(alice, w.superadmin.id).await.unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");
}

#[tokio::test]
async fn test_role_administration() {
    let w = World::new().await;
    let alice = w.actor("alice").await;
    let matrix = PermissionMatrix::from_strings(&["review:read"]);

    let err = w.roles.create_role(alice, "reviewer", matrix.clone()).await.unwrap_err();
    assert!(matches!(err, CoreError::Forbidden(_)));

    let role = w.roles.create_role(w.root, "reviewer", matrix).await.unwrap();
    let err = w
        .roles
        .create_role(w.root, "reviewer", PermissionMatrix::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));

    let updated = w
        .roles
        .set_permissions(w.root, role.id, PermissionMatrix::from_strings(&["review:update"]))
        .await
        .unwrap();
    assert!(updated.permissions.allows(Module::Review, Action::Update));
    assert!(!updated.permissions.allows(Module::Review, Action::Read));
    assert_eq!(updated.log.and_then(|l| l.updater_user_id), Some(w.root));
}

#[tokio::test]
async fn test_register_is_idempotent() {
    let w = World::new().await;
    let first = w
        .actors
        .register(
            "idp|dana",
            ActorProfile {
                first_name: Some("Dana".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let again = w.actors.register("idp|dana", ActorProfile::default()).await.unwrap();
    assert_eq!(first.id, again.id);
    assert_eq!(again.first_name.as_deref(), Some("Dana"));

    assert!(w.actors.register("  ", ActorProfile::default()).await.is_err());
}

#[tokio::test]
async fn test_register_resolves_duplicate_subject_to_earliest() {
    let w = World::new().await;
    let first = bulletin_org::Actor::new("idp|twin", ActorProfile::default());
    let second = bulletin_org::Actor::new("idp|twin", ActorProfile::default());
    w.store.insert(&second).await.unwrap();
    w.store.insert(&first).await.unwrap();
    let earliest = first.id.min(second.id);

    let registered = w.actors.register("idp|twin", ActorProfile::default()).await.unwrap();
    assert_eq!(registered.id, earliest);
    let found = w.actors.by_ext_id("idp|twin").await.unwrap().unwrap();
    assert_eq!(found.id, earliest);
}

#[tokio::test]
async fn test_search_actors_by_name() {
    let w = World::new().await;
    let profile = |first: &str, last: &str| ActorProfile {
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
        ..Default::default()
    };
    let ana = w.actors.register("idp|ana", profile("Ana", "Rojas")).await.unwrap();
    let juan = w.actors.register("idp|juan", profile("Juan", "Santana")).await.unwrap();
    w.actors.register("idp|luis", profile("Luis", "Pardo")).await.unwrap();

    let found = w.actors.search_by_name(w.root, "ANA").await.unwrap();
    let mut ids: Vec<Uuid> = found.iter().map(|a| a.id).collect();
    ids.sort();
    let mut expected = vec![ana.id, juan.id];
    expected.sort();
    assert_eq!(ids, expected);

    let err = w.actors.search_by_name(ana.id, "ana").await.unwrap_err();
    assert_eq!(err.denial().map(|d| d.reason), Some(DenialReason::GlobalAdminRequired));
}

#[tokio::test]
async fn test_actor_visibility_rules() {
    let w = World::new().await;
    let g = w.group("North").await;
    let boss = w.actor("boss").await;
    let alice = w.actor("alice").await;
    let bob = w.actor("bob").await;
    w.join(g, boss, &w.admin).await;
    w.join(g, alice, &w.reader).await;

    // Self.
    assert_eq!(w.actors.get_for(alice, alice).await.unwrap().id, alice);
    // Global admin sees anyone.
    assert_eq!(w.actors.get_for(w.root, bob).await.unwrap().id, bob);
    // Group admin sees regular actors but not global admins.
    assert_eq!(w.actors.get_for(boss, bob).await.unwrap().id, bob);
    let err = w.actors.get_for(boss, w.root).await.unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");
    // Plain actors see only themselves.
    let err = w.actors.get_for(alice, bob).await.unwrap_err();
    assert_eq!(err.error_code(), "FORBIDDEN");
}

#[tokio::test]
async fn test_activation_requires_global_admin() {
    let w = World::new().await;
    let alice = w.actor("alice").await;
    let bob = w.actor("bob").await;

    assert!(w.actors.set_active(alice, bob, false).await.is_err());

    let updated = w.actors.set_active(w.root, bob, false).await.unwrap();
    assert!(!updated.is_active);
    assert_eq!(updated.log.updater_user_id, Some(w.root));

    let inactive = w.actors.list_by_status(w.root, false).await.unwrap();
    assert_eq!(inactive.iter().map(|a| a.id).collect::<Vec<_>>(), vec![bob]);

    w.actors.set_active(w.root, bob, true).await.unwrap();
    assert!(w.actors.list_by_status(w.root, false).await.unwrap().is_empty());
}
