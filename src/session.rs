// ============================================================================
// Structure : SessionStore (authentification de démo)
// ============================================================================
// Comptes stockés EN CLAIR dans un fichier JSON local (équivalent du
// "local storage" du navigateur) : un tableau de {name, email, phone,
// password}, sans version ni migration.
//
// Flux d'inscription :
// 1. register(record) : vérifie l'unicité de l'email, met en attente
// 2. confirm(code) : compare au code fixe, persiste, ouvre la session
//
// ATTENTION : démo locale uniquement. Pas de hash, pas de token.
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::models::{PlanTier, Session, UserRecord};

/// Inscription en attente du code de vérification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRegistration {
    pub email: String,
}

#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    verification_code: String,
    users: Vec<UserRecord>,
    pending: Option<UserRecord>,
    current: Option<Session>,
}

impl SessionStore {
    /// Ouvre le store depuis le fichier. Fichier absent = liste vide.
    pub fn open(path: impl Into<PathBuf>, verification_code: impl Into<String>) -> Result<Self, AuthError> {
        let path = path.into();
        let users = load_users(&path)?;
        debug!(path = %path.display(), users = users.len(), "Session store opened");

        Ok(Self {
            path,
            verification_code: verification_code.into(),
            users,
            pending: None,
            current: None,
        })
    }

    /// Démarre une inscription
    ///
    /// Refuse un email déjà persisté ou déjà en attente (insensible à la
    /// casse). Rien n'est écrit avant confirm(). L'inscription d'un autre
    /// email remplace celle en attente.
    pub fn register(&mut self, record: UserRecord) -> Result<PendingRegistration, AuthError> {
        if record.email.trim().is_empty() || record.password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        if self.users.iter().any(|u| u.has_email(&record.email)) {
            warn!(email = %record.email, "Registration rejected: email already taken");
            return Err(AuthError::EmailTaken);
        }

        if self.pending.as_ref().is_some_and(|p| p.has_email(&record.email)) {
            warn!(email = %record.email, "Registration rejected: email already pending");
            return Err(AuthError::EmailTaken);
        }

        let pending = PendingRegistration {
            email: record.email.trim().to_string(),
        };
        info!(email = %pending.email, "Registration pending verification");
        self.pending = Some(UserRecord {
            email: pending.email.clone(),
            ..record
        });
        Ok(pending)
    }

    /// Valide l'inscription en attente avec le code fixe
    ///
    /// Code faux : l'inscription reste en attente.
    pub fn confirm(&mut self, code: &str) -> Result<Session, AuthError> {
        let Some(record) = self.pending.as_ref() else {
            return Err(AuthError::NoPendingRegistration);
        };

        if code.trim() != self.verification_code {
            warn!(email = %record.email, "Invalid verification code");
            return Err(AuthError::InvalidCode);
        }

        // Le fichier a pu changer entre register et confirm
        if self.users.iter().any(|u| u.has_email(&record.email)) {
            self.pending = None;
            return Err(AuthError::EmailTaken);
        }

        let record = self.pending.take().ok_or(AuthError::NoPendingRegistration)?;
        self.users.push(record.clone());

        if let Err(e) = save_users(&self.path, &self.users) {
            // Rollback : on remet l'inscription en attente
            self.users.pop();
            self.pending = Some(record);
            return Err(e);
        }

        let session = Session::from_record(&record);
        info!(email = %session.email, "Registration confirmed");
        self.current = Some(session.clone());
        Ok(session)
    }

    /// Login par comparaison exacte du mot de passe
    ///
    /// Email inconnu et mauvais mot de passe donnent la même erreur.
    pub fn login(&mut self, email: &str, password: &str) -> Result<Session, AuthError> {
        let record = self
            .users
            .iter()
            .find(|u| u.has_email(email) && u.password == password)
            .ok_or_else(|| {
                warn!("Login failed");
                AuthError::InvalidCredentials
            })?;

        let session = Session::from_record(record);
        info!(email = %session.email, "User logged in");
        self.current = Some(session.clone());
        Ok(session)
    }

    pub fn logout(&mut self) {
        if let Some(session) = self.current.take() {
            info!(email = %session.email, "User logged out");
        }
    }

    /// Abonnement simulé : passe la session courante en Pro
    pub fn upgrade_plan(&mut self) -> Result<&Session, AuthError> {
        let session = self.current.as_mut().ok_or(AuthError::NotLoggedIn)?;
        session.plan = PlanTier::Pro;
        info!(email = %session.email, "Plan upgraded to Pro");
        Ok(&*session)
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn pending(&self) -> Option<&UserRecord> {
        self.pending.as_ref()
    }

    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ============================================================================
// Persistance JSON
// ============================================================================

fn load_users(path: &Path) -> Result<Vec<UserRecord>, AuthError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let raw = fs::read(path).map_err(|e| AuthError::Storage(e.to_string()))?;
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    serde_json::from_slice(&raw).map_err(|e| AuthError::Storage(e.to_string()))
}

fn save_users(path: &Path, users: &[UserRecord]) -> Result<(), AuthError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AuthError::Storage(e.to_string()))?;
    }

    let json = serde_json::to_vec_pretty(users).map_err(|e| AuthError::Storage(e.to_string()))?;
    fs::write(path, json).map_err(|e| AuthError::Storage(e.to_string()))?;
    debug!(path = %path.display(), users = users.len(), "Users persisted");
    Ok(())
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const CODE: &str = "123456";

    /// Fichier unique dans le répertoire temporaire
    fn temp_users_file() -> PathBuf {
        std::env::temp_dir()
            .join(format!("cryvex-test-{}", Uuid::new_v4()))
            .join("users.json")
    }

    fn registered_store() -> SessionStore {
        let mut store = SessionStore::open(temp_users_file(), CODE).unwrap();
        store
            .register(UserRecord::new("ana@example.com", "s3cret").with_name("Ana"))
            .unwrap();
        store.confirm(CODE).unwrap();
        store.logout();
        store
    }

    #[test]
    fn test_missing_file_is_empty() {
        let store = SessionStore::open(temp_users_file(), CODE).unwrap();
        assert!(store.users().is_empty());
        assert!(store.current().is_none());
    }

    #[test]
    fn test_register_defers_persistence_until_confirm() {
        let path = temp_users_file();
        let mut store = SessionStore::open(&path, CODE).unwrap();

        let pending = store
            .register(UserRecord::new("bob@example.com", "pw").with_phone("+55 11 9999"))
            .unwrap();
        assert_eq!(pending.email, "bob@example.com");
        assert!(store.users().is_empty());
        assert!(!path.exists());

        let session = store.confirm(CODE).unwrap();
        assert_eq!(session.email, "bob@example.com");
        assert_eq!(session.plan, PlanTier::Free);

        // Relu depuis le disque
        let reopened = SessionStore::open(&path, CODE).unwrap();
        assert_eq!(reopened.users().len(), 1);
        assert_eq!(reopened.users()[0].phone.as_deref(), Some("+55 11 9999"));
    }

    #[test]
    fn test_wrong_code_keeps_registration_pending() {
        let mut store = SessionStore::open(temp_users_file(), CODE).unwrap();
        store.register(UserRecord::new("bob@example.com", "pw")).unwrap();

        assert_eq!(store.confirm("000000"), Err(AuthError::InvalidCode));
        assert!(store.pending().is_some());
        assert!(store.users().is_empty());

        assert!(store.confirm(CODE).is_ok());
        assert!(store.pending().is_none());
    }

    #[test]
    fn test_register_rejects_email_already_pending() {
        let mut store = SessionStore::open(temp_users_file(), CODE).unwrap();
        store.register(UserRecord::new("bob@example.com", "first")).unwrap();

        let result = store.register(UserRecord::new("BOB@example.com", "second"));
        assert_eq!(result, Err(AuthError::EmailTaken));

        // L'inscription d'origine reste en attente, intacte
        let pending = store.pending().unwrap();
        assert_eq!(pending.email, "bob@example.com");
        assert_eq!(pending.password, "first");
    }

    #[test]
    fn test_register_other_email_replaces_pending() {
        let mut store = SessionStore::open(temp_users_file(), CODE).unwrap();
        store.register(UserRecord::new("bob@example.com", "pw")).unwrap();
        store.register(UserRecord::new("eve@example.com", "pw")).unwrap();

        assert_eq!(store.pending().unwrap().email, "eve@example.com");
        assert_eq!(store.confirm(CODE).unwrap().email, "eve@example.com");
    }

    #[test]
    fn test_confirm_without_pending() {
        let mut store = SessionStore::open(temp_users_file(), CODE).unwrap();
        assert_eq!(store.confirm(CODE), Err(AuthError::NoPendingRegistration));
    }

    #[test]
    fn test_register_duplicate_email_fails_and_keeps_list() {
        let mut store = registered_store();
        let before = store.users().to_vec();

        let result = store.register(UserRecord::new("ANA@example.com", "other"));
        assert_eq!(result, Err(AuthError::EmailTaken));
        assert_eq!(store.users(), before.as_slice());
        assert!(store.pending().is_none());

        let on_disk = SessionStore::open(store.path(), CODE).unwrap();
        assert_eq!(on_disk.users(), before.as_slice());
    }

    #[test]
    fn test_register_requires_email_and_password() {
        let mut store = SessionStore::open(temp_users_file(), CODE).unwrap();
        assert_eq!(
            store.register(UserRecord::new("  ", "pw")),
            Err(AuthError::MissingFields)
        );
        assert_eq!(
            store.register(UserRecord::new("a@b.c", "")),
            Err(AuthError::MissingFields)
        );
    }

    #[test]
    fn test_login() {
        let mut store = registered_store();

        let session = store.login("ana@example.com", "s3cret").unwrap();
        assert_eq!(session.display_name(), "Ana");
        assert_eq!(store.current(), Some(&session));
    }

    #[test]
    fn test_login_failure_does_not_reveal_email_existence() {
        let mut store = registered_store();

        let wrong_password = store.login("ana@example.com", "nope").unwrap_err();
        let unknown_email = store.login("ghost@example.com", "s3cret").unwrap_err();

        assert_eq!(wrong_password, AuthError::InvalidCredentials);
        assert_eq!(wrong_password, unknown_email);
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert!(store.current().is_none());
    }

    #[test]
    fn test_upgrade_plan() {
        let mut store = registered_store();
        assert_eq!(store.upgrade_plan().unwrap_err(), AuthError::NotLoggedIn);

        store.login("ana@example.com", "s3cret").unwrap();
        assert_eq!(store.upgrade_plan().unwrap().plan, PlanTier::Pro);

        store.logout();
        assert!(store.current().is_none());
    }

    #[test]
    fn test_corrupt_file_is_a_storage_error() {
        let path = temp_users_file();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"{not json").unwrap();

        assert!(matches!(
            SessionStore::open(&path, CODE),
            Err(AuthError::Storage(_))
        ));
    }
}
