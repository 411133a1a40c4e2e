//! Static mapping of roles to their navigation trees.

use std::borrow::Cow;

use serde::Serialize;

use parcelhub_auth::Role;

/// A dashboard page that a navigation item can activate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewId {
    Analytics,
    ManageParcels,
    ManageUsers,
    SendParcel,
    ParcelDetails,
    SenderHistory,
    IncomingParcels,
    ConfirmDelivery,
    DeliveryHistory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub title: Cow<'static, str>,
    pub url: Cow<'static, str>,
    /// `None` only for items built outside the registry; such items never
    /// become routes.
    pub view: Option<ViewId>,
}

impl NavItem {
    pub const fn new(title: &'static str, url: &'static str, view: ViewId) -> Self {
        Self {
            title: Cow::Borrowed(title),
            url: Cow::Borrowed(url),
            view: Some(view),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavSection {
    pub title: Cow<'static, str>,
    pub items: Vec<NavItem>,
}

impl NavSection {
    pub fn new(title: &'static str, items: Vec<NavItem>) -> Self {
        Self {
            title: Cow::Borrowed(title),
            items,
        }
    }
}

/// One of the three role-gated dashboard layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dashboard {
    Admin,
    Sender,
    Receiver,
}

impl Dashboard {
    pub const ALL: [Dashboard; 3] = [Dashboard::Admin, Dashboard::Sender, Dashboard::Receiver];

    pub fn base_path(&self) -> &'static str {
        match self {
            Dashboard::Admin => "/admin",
            Dashboard::Sender => "/sender",
            Dashboard::Receiver => "/receiver",
        }
    }

    /// Where the dashboard's bare base path redirects to.
    pub fn index_path(&self) -> &'static str {
        match self {
            Dashboard::Admin => "/admin/analytics",
            Dashboard::Sender => "/sender/send-parcel",
            Dashboard::Receiver => "/receiver/incoming-parcels",
        }
    }

    pub fn required_role(&self) -> Role {
        match self {
            Dashboard::Admin => Role::Admin,
            Dashboard::Sender => Role::Sender,
            Dashboard::Receiver => Role::Receiver,
        }
    }

    /// The dashboard a role lands on; SUPER_ADMIN shares the admin one.
    pub fn for_role(role: Role) -> Dashboard {
        match role {
            Role::SuperAdmin | Role::Admin => Dashboard::Admin,
            Role::Sender => Dashboard::Sender,
            Role::Receiver => Dashboard::Receiver,
        }
    }

    pub fn sections(&self) -> Vec<NavSection> {
        match self {
            Dashboard::Admin => admin_sections(),
            Dashboard::Sender => sender_sections(),
            Dashboard::Receiver => receiver_sections(),
        }
    }
}

pub fn admin_sections() -> Vec<NavSection> {
    vec![
        NavSection::new(
            "Dashboard",
            vec![NavItem::new("Analytics", "/admin/analytics", ViewId::Analytics)],
        ),
        NavSection::new(
            "Management",
            vec![
                NavItem::new("Parcels", "/admin/parcels", ViewId::ManageParcels),
                NavItem::new("Users", "/admin/users", ViewId::ManageUsers),
            ],
        ),
    ]
}

pub fn sender_sections() -> Vec<NavSection> {
    vec![NavSection::new(
        "Parcel Informations",
        vec![
            NavItem::new("Send Parcel", "/sender/send-parcel", ViewId::SendParcel),
            NavItem::new("Parcel Details", "/sender/parcel-details", ViewId::ParcelDetails),
            NavItem::new("History", "/sender/history", ViewId::SenderHistory),
        ],
    )]
}

pub fn receiver_sections() -> Vec<NavSection> {
    vec![
        NavSection::new(
            "Dashboard",
            vec![NavItem::new(
                "Incoming Parcels",
                "/receiver/incoming-parcels",
                ViewId::IncomingParcels,
            )],
        ),
        NavSection::new(
            "Delivery",
            vec![
                NavItem::new("Confirm Delivery", "/receiver/confirm-delivery", ViewId::ConfirmDelivery),
                NavItem::new("Delivery History", "/receiver/delivery-history", ViewId::DeliveryHistory),
            ],
        ),
    ]
}

/// A single role's static navigation tree.
pub fn sections_for(role: Role) -> Vec<NavSection> {
    Dashboard::for_role(role).sections()
}
