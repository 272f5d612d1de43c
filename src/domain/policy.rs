//! Authorization policy: pure decision functions over an already-fetched
//! resource. No I/O happens here; a denial is a value, not an exception.
//! Client-facing messages are kept verbatim for compatibility.

use uuid::Uuid;

use super::role::{PostStatus, Role};

/// The authenticated caller as far as policy is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    pub role: Role,
}

/// A denial with its client-facing message. Maps to HTTP 403.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct Denied(pub String);

fn deny(message: &str) -> Result<(), Denied> {
    Err(Denied(message.to_string()))
}

fn require_role(caller: Caller, role: Role, message: &str) -> Result<(), Denied> {
    if caller.role == role {
        Ok(())
    } else {
        deny(message)
    }
}

/// Ownership gate shared by posts and contracts: the caller passes when
/// admin, or when their role appears in `owners` paired with their own id.
/// Roles absent from both lists are denied outright.
fn require_owner_or_admin(caller: Caller, owners: &[(Role, Uuid)], message: &str) -> Result<(), Denied> {
    if caller.role == Role::Admin {
        return Ok(());
    }
    for (role, owner_id) in owners {
        if caller.role == *role {
            return if caller.id == *owner_id { Ok(()) } else { deny(message) };
        }
    }
    deny(message)
}

// Admin surface

pub fn can_create_admin(caller: Caller) -> Result<(), Denied> {
    require_role(caller, Role::Admin, "Chỉ admin mới có quyền tạo tài khoản admin mới.")
}

pub fn can_list_users(caller: Caller) -> Result<(), Denied> {
    require_role(caller, Role::Admin, "Chỉ admin mới có quyền xem danh sách người dùng.")
}

pub fn can_view_user_detail(caller: Caller) -> Result<(), Denied> {
    require_role(caller, Role::Admin, "Chỉ admin mới có quyền xem chi tiết hồ sơ người dùng.")
}

pub fn can_list_all_contracts(caller: Caller) -> Result<(), Denied> {
    require_role(caller, Role::Admin, "Chỉ admin mới có quyền xem danh sách hợp đồng.")
}

// Rental posts

pub fn can_create_post(caller: Caller) -> Result<(), Denied> {
    require_role(caller, Role::Landlord, "Chỉ landlord mới có quyền tạo bài đăng.")
}

pub fn can_list_own_posts(caller: Caller) -> Result<(), Denied> {
    require_role(caller, Role::Landlord, "Chỉ landlord mới có quyền xem bài đăng của mình.")
}

/// Content edits are owner-landlord only; admins moderate through
/// approve/reject/delete instead.
pub fn can_update_post(caller: Caller, post_landlord_id: Uuid) -> Result<(), Denied> {
    if caller.role == Role::Landlord && caller.id == post_landlord_id {
        Ok(())
    } else {
        deny("Không có quyền chỉnh sửa bài đăng này")
    }
}

pub fn can_delete_post(caller: Caller, post_landlord_id: Uuid) -> Result<(), Denied> {
    match caller.role {
        Role::Admin => Ok(()),
        Role::Landlord if caller.id == post_landlord_id => Ok(()),
        Role::Landlord => deny("Không có quyền xóa bài đăng này"),
        Role::Tenant => deny("Không có quyền xóa bài đăng"),
    }
}

/// Approved posts are visible to every authenticated caller; pending and
/// rejected posts only to the owning landlord or an admin.
pub fn can_view_post(caller: Caller, post_landlord_id: Uuid, status: PostStatus) -> Result<(), Denied> {
    if status == PostStatus::Approved || caller.role == Role::Admin {
        return Ok(());
    }
    if caller.role == Role::Landlord && caller.id == post_landlord_id {
        return Ok(());
    }
    deny("Bài đăng chưa được duyệt")
}

pub fn can_approve_post(caller: Caller) -> Result<(), Denied> {
    require_role(caller, Role::Admin, "Chỉ admin mới có quyền duyệt bài")
}

pub fn can_reject_post(caller: Caller) -> Result<(), Denied> {
    require_role(caller, Role::Admin, "Chỉ admin mới có quyền từ chối bài")
}

// Contracts

pub fn can_create_contract(caller: Caller) -> Result<(), Denied> {
    require_role(caller, Role::Tenant, "Chỉ tenant mới có quyền tạo hợp đồng.")
}

pub fn can_list_own_contracts(caller: Caller) -> Result<(), Denied> {
    require_role(caller, Role::Tenant, "Chỉ tenant mới có quyền xem hợp đồng của mình")
}

pub fn can_list_landlord_contracts(caller: Caller) -> Result<(), Denied> {
    require_role(caller, Role::Landlord, "Chỉ landlord mới có quyền xem hợp đồng của mình")
}

pub fn can_view_contract(caller: Caller, tenant_id: Uuid, landlord_id: Uuid) -> Result<(), Denied> {
    require_owner_or_admin(
        caller,
        &[(Role::Tenant, tenant_id), (Role::Landlord, landlord_id)],
        "Bạn không có quyền xem hợp đồng này",
    )
}

pub fn can_update_contract(caller: Caller, tenant_id: Uuid, landlord_id: Uuid) -> Result<(), Denied> {
    require_owner_or_admin(
        caller,
        &[(Role::Tenant, tenant_id), (Role::Landlord, landlord_id)],
        "Không có quyền chỉnh sửa hợp đồng này",
    )
}

pub fn can_delete_contract(caller: Caller, tenant_id: Uuid, landlord_id: Uuid) -> Result<(), Denied> {
    require_owner_or_admin(
        caller,
        &[(Role::Tenant, tenant_id), (Role::Landlord, landlord_id)],
        "Không có quyền xóa hợp đồng này",
    )
}

pub fn can_terminate_contract(caller: Caller, landlord_id: Uuid) -> Result<(), Denied> {
    match caller.role {
        Role::Admin => Ok(()),
        Role::Landlord if caller.id == landlord_id => Ok(()),
        Role::Landlord => deny("Bạn không thể kết thúc hợp đồng này"),
        Role::Tenant => deny("Chỉ landlord hoặc admin mới có quyền kết thúc hợp đồng"),
    }
}

// Recommendations

pub fn can_get_recommendations(caller: Caller) -> Result<(), Denied> {
    require_role(caller, Role::Tenant, "Chỉ tenant mới có quyền sử dụng tính năng này.")
}
