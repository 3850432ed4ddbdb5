//! JSON snapshot loader seeding the in-memory store.
//!
//! A snapshot mirrors the relational layout of a canteen database: users
//! reference their company and shift by id, extra vouchers reference their
//! holder. References are resolved while building the store so every domain
//! entity handed to the engine is complete.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::domain::ports::RedemptionStoreError;
use crate::domain::{
    Company, CompanyId, DisposableVoucher, ExtraVoucher, MealType, MealTypeDraft, MealTypeId,
    RedemptionRecord, Shift, ShiftId, ShiftKind, TimeOfDay, User, UserDraft, UserId, VoucherCode,
};

use super::memory::InMemoryRedemptionStore;

/// Errors raised while reading or resolving a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The snapshot file could not be read.
    #[error("failed to read snapshot at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The snapshot is not valid JSON for the expected layout.
    #[error("failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),
    /// A row failed domain validation.
    #[error("invalid {entity} {key}: {message}")]
    Invalid {
        entity: &'static str,
        key: String,
        message: String,
    },
    /// A row references an id that the snapshot does not define.
    #[error("{entity} {key} references unknown {target} {reference}")]
    UnknownReference {
        entity: &'static str,
        key: String,
        target: &'static str,
        reference: String,
    },
    /// Seeding the store failed.
    #[error(transparent)]
    Store(#[from] RedemptionStoreError),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct MealTypeRow {
    id: MealTypeId,
    name: String,
    service_start: TimeOfDay,
    service_end: TimeOfDay,
    #[serde(default)]
    tolerance_minutes: u16,
    #[serde(default = "active_by_default")]
    active: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct CompanyRow {
    id: CompanyId,
    name: String,
    #[serde(default = "active_by_default")]
    active: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ShiftRow {
    id: ShiftId,
    kind: ShiftKind,
    shift_start: TimeOfDay,
    shift_end: TimeOfDay,
    #[serde(default = "active_by_default")]
    active: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct UserRow {
    id: UserId,
    name: String,
    voucher: VoucherCode,
    #[serde(default)]
    suspended: bool,
    company_id: CompanyId,
    shift_id: ShiftId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct DisposableVoucherRow {
    code: VoucherCode,
    meal_type_id: MealTypeId,
    expires_at: DateTime<Utc>,
    #[serde(default)]
    used_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ExtraVoucherRow {
    code: VoucherCode,
    user_id: UserId,
    #[serde(default)]
    meal_type_id: Option<MealTypeId>,
    valid_on: NaiveDate,
    #[serde(default)]
    used_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RedemptionRow {
    user_id: UserId,
    meal_type_id: MealTypeId,
    used_at: DateTime<Utc>,
}

const fn active_by_default() -> bool {
    true
}

/// Parsed snapshot document, references not yet resolved.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Snapshot {
    #[serde(default)]
    meal_types: Vec<MealTypeRow>,
    #[serde(default)]
    companies: Vec<CompanyRow>,
    #[serde(default)]
    shifts: Vec<ShiftRow>,
    #[serde(default)]
    users: Vec<UserRow>,
    #[serde(default)]
    disposable_vouchers: Vec<DisposableVoucherRow>,
    #[serde(default)]
    extra_vouchers: Vec<ExtraVoucherRow>,
    #[serde(default)]
    redemptions: Vec<RedemptionRow>,
}

impl Snapshot {
    /// Parse a snapshot from JSON text.
    pub fn from_json(raw: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Read and parse the snapshot stored at `path`.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let raw = read_to_string(path).map_err(|source| SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Resolve references and seed a fresh in-memory store.
    pub fn into_store(self) -> Result<InMemoryRedemptionStore, SnapshotError> {
        let store = InMemoryRedemptionStore::new();

        let mut meal_type_ids = Vec::with_capacity(self.meal_types.len());
        for row in self.meal_types {
            let meal_type = build_meal_type(row)?;
            meal_type_ids.push(*meal_type.id());
            store.insert_meal_type(meal_type)?;
        }

        let companies = self
            .companies
            .into_iter()
            .map(|row| {
                let key = row.id.to_string();
                Company::new(row.id, row.name, row.active)
                    .map(|company| (*company.id(), company))
                    .map_err(|err| invalid("company", key, err))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;

        let shifts: HashMap<_, _> = self
            .shifts
            .into_iter()
            .map(|row| {
                let shift = Shift::new(
                    row.id,
                    row.kind,
                    row.shift_start,
                    row.shift_end,
                    row.active,
                );
                (row.id, shift)
            })
            .collect();

        let mut users = HashMap::with_capacity(self.users.len());
        for row in self.users {
            let user = build_user(row, &companies, &shifts)?;
            users.insert(*user.id(), user.clone());
            store.insert_user(user)?;
        }

        for row in self.disposable_vouchers {
            ensure_meal_type(
                "disposable voucher",
                row.code.as_ref(),
                &meal_type_ids,
                &row.meal_type_id,
            )?;
            store.insert_disposable_voucher(DisposableVoucher::new(
                row.code,
                row.meal_type_id,
                row.expires_at,
                row.used_at,
            ))?;
        }

        for row in self.extra_vouchers {
            let holder = users.get(&row.user_id).cloned().ok_or_else(|| {
                unknown("extra voucher", row.code.as_ref(), "user", &row.user_id)
            })?;
            if let Some(meal_type_id) = row.meal_type_id.as_ref() {
                ensure_meal_type(
                    "extra voucher",
                    row.code.as_ref(),
                    &meal_type_ids,
                    meal_type_id,
                )?;
            }
            store.insert_extra_voucher(ExtraVoucher::new(
                row.code,
                holder,
                row.meal_type_id,
                row.valid_on,
                row.used_at,
            ))?;
        }

        for row in self.redemptions {
            if !users.contains_key(&row.user_id) {
                return Err(unknown(
                    "redemption",
                    &row.used_at.to_rfc3339(),
                    "user",
                    &row.user_id,
                ));
            }
            store.insert_redemption(RedemptionRecord::new(
                row.user_id,
                row.meal_type_id,
                row.used_at,
            ))?;
        }

        Ok(store)
    }
}

fn build_meal_type(row: MealTypeRow) -> Result<MealType, SnapshotError> {
    let key = row.id.to_string();
    MealType::new(MealTypeDraft {
        id: row.id,
        name: row.name,
        service_start: row.service_start,
        service_end: row.service_end,
        tolerance_minutes: row.tolerance_minutes,
        active: row.active,
    })
    .map_err(|err| invalid("meal type", key, err))
}

fn build_user(
    row: UserRow,
    companies: &HashMap<CompanyId, Company>,
    shifts: &HashMap<ShiftId, Shift>,
) -> Result<User, SnapshotError> {
    let key = row.id.to_string();
    let company = companies
        .get(&row.company_id)
        .cloned()
        .ok_or_else(|| unknown("user", &key, "company", &row.company_id))?;
    let shift = shifts
        .get(&row.shift_id)
        .cloned()
        .ok_or_else(|| unknown("user", &key, "shift", &row.shift_id))?;
    User::new(UserDraft {
        id: row.id,
        name: row.name,
        voucher: row.voucher,
        suspended: row.suspended,
        company,
        shift,
    })
    .map_err(|err| invalid("user", key, err))
}

fn ensure_meal_type(
    entity: &'static str,
    key: &str,
    known: &[MealTypeId],
    meal_type_id: &MealTypeId,
) -> Result<(), SnapshotError> {
    if known.contains(meal_type_id) {
        Ok(())
    } else {
        Err(unknown(entity, key, "meal type", meal_type_id))
    }
}

fn invalid(entity: &'static str, key: String, err: impl std::fmt::Display) -> SnapshotError {
    SnapshotError::Invalid {
        entity,
        key,
        message: err.to_string(),
    }
}

fn unknown(
    entity: &'static str,
    key: &str,
    target: &'static str,
    reference: &impl std::fmt::Display,
) -> SnapshotError {
    SnapshotError::UnknownReference {
        entity,
        key: key.to_owned(),
        target,
        reference: reference.to_string(),
    }
}

fn read_to_string(path: &Path) -> std::io::Result<String> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "snapshot path must include a file name",
        )
    })?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
    directory.read_to_string(file_name)
}
