use actix_session::Session;
use actix_web::web::{Data, Form};
use actix_web::{get, post, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::error::Error;
use crate::flash::put_flash;
use crate::views::{self, ViewRenderer};
use crate::violations::{Violation, Violations};

use super::{manager, Principal, User, UserProfile};

const NAME_MAX_LENGTH: usize = 50;
const EMAIL_MAX_LENGTH: usize = 254;
const PASSWORD_MAX_LENGTH: usize = 64;

const REGISTERED_MESSAGE: &str = "Welcome! Your account has been created.";
const UPDATED_MESSAGE: &str = "Your profile has been updated.";

/// Used both for registering and for editing one's own profile. The password
/// is never echoed back into a rendered form.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing)]
    pub pass: String,
}

impl ProfileForm {
    pub fn of(user: &User) -> ProfileForm {
        ProfileForm {
            last_name: user.last_name.clone(),
            first_name: user.first_name.clone(),
            email: user.email.clone(),
            pass: String::new(),
        }
    }

    pub fn validate(&self) -> Result<UserProfile, Violations> {
        let mut violations = Violations::new();
        violations.require("last_name", &self.last_name, NAME_MAX_LENGTH);
        violations.require("first_name", &self.first_name, NAME_MAX_LENGTH);
        violations.require("email", &self.email, EMAIL_MAX_LENGTH);
        violations.require("pass", &self.pass, PASSWORD_MAX_LENGTH);

        if !violations.has("email") && !looks_like_email(self.email.trim()) {
            violations.push(Violation::FieldMalformed { field: "email" });
        }

        violations.into_result(UserProfile {
            last_name: self.last_name.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.pass.clone(),
        })
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing)]
    pub pass: String,
}

fn render_form(
    views: &dyn ViewRenderer,
    template: &str,
    principal: Option<&Principal>,
    form: &impl Serialize,
    errors: &Violations,
) -> Result<HttpResponse, Error> {
    let mut context = views::context(principal);
    context.insert("user", form);
    context.insert("errors", errors);

    views::page(views, template, &context)
}

fn store_principal(session: &Session, principal: &Principal) -> Result<(), Error> {
    session.insert(Principal::SESSION_KEY, principal)?;

    Ok(())
}

#[get("/user/edit")]
#[tracing::instrument(skip(db, views))]
pub async fn edit_profile(
    db: Data<Box<dyn Database>>,
    views: Data<Box<dyn ViewRenderer>>,
    principal: Principal,
) -> Result<HttpResponse, Error> {
    let user = manager::get_user(&***db, &principal).await?;

    render_form(
        &***views,
        "user/edit.html",
        Some(&principal),
        &ProfileForm::of(&user),
        &Violations::new(),
    )
}

#[post("/user/edit")]
#[tracing::instrument(skip(db, views, session, form))]
pub async fn update_profile(
    db: Data<Box<dyn Database>>,
    views: Data<Box<dyn ViewRenderer>>,
    principal: Principal,
    session: Session,
    form: Form<ProfileForm>,
) -> Result<HttpResponse, Error> {
    let form = form.into_inner();

    let profile = match form.validate() {
        Ok(profile) => profile,
        Err(errors) => {
            return render_form(&***views, "user/edit.html", Some(&principal), &form, &errors);
        }
    };

    let refreshed = match manager::update_profile(&***db, &principal, profile).await {
        Ok(refreshed) => refreshed,
        Err(Error::EmailAlreadyRegistered { .. }) => {
            let errors = Violation::EmailAlreadyRegistered { field: "email" }.into();
            return render_form(&***views, "user/edit.html", Some(&principal), &form, &errors);
        }
        Err(err) => return Err(err),
    };

    store_principal(&session, &refreshed)?;
    put_flash(&session, UPDATED_MESSAGE)?;
    Ok(views::redirect("/"))
}

#[get("/register")]
#[tracing::instrument(skip(views))]
pub async fn register_form(
    views: Data<Box<dyn ViewRenderer>>,
    principal: Option<Principal>,
) -> Result<HttpResponse, Error> {
    render_form(
        &***views,
        "user/register.html",
        principal.as_ref(),
        &ProfileForm::default(),
        &Violations::new(),
    )
}

#[post("/register")]
#[tracing::instrument(skip(db, views, session, form))]
pub async fn register(
    db: Data<Box<dyn Database>>,
    views: Data<Box<dyn ViewRenderer>>,
    session: Session,
    form: Form<ProfileForm>,
) -> Result<HttpResponse, Error> {
    let form = form.into_inner();

    let profile = match form.validate() {
        Ok(profile) => profile,
        Err(errors) => {
            return render_form(&***views, "user/register.html", None, &form, &errors);
        }
    };

    let user = match manager::register_user(&***db, profile).await {
        Ok(user) => user,
        Err(Error::EmailAlreadyRegistered { .. }) => {
            let errors = Violation::EmailAlreadyRegistered { field: "email" }.into();
            return render_form(&***views, "user/register.html", None, &form, &errors);
        }
        Err(err) => return Err(err),
    };

    session.renew();
    store_principal(&session, &Principal::of(&user))?;
    put_flash(&session, REGISTERED_MESSAGE)?;
    Ok(views::redirect("/"))
}

#[get("/login")]
#[tracing::instrument(skip(views))]
pub async fn login_form(views: Data<Box<dyn ViewRenderer>>) -> Result<HttpResponse, Error> {
    render_form(
        &***views,
        "user/login.html",
        None,
        &LoginForm::default(),
        &Violations::new(),
    )
}

#[post("/login")]
#[tracing::instrument(skip(db, views, session, form))]
pub async fn login(
    db: Data<Box<dyn Database>>,
    views: Data<Box<dyn ViewRenderer>>,
    session: Session,
    form: Form<LoginForm>,
) -> Result<HttpResponse, Error> {
    let form = form.into_inner();

    let mut violations = Violations::new();
    violations.require("email", &form.email, EMAIL_MAX_LENGTH);
    violations.require("pass", &form.pass, PASSWORD_MAX_LENGTH);
    if let Err(errors) = violations.into_result(()) {
        return render_form(&***views, "user/login.html", None, &form, &errors);
    }

    let principal = match manager::authenticate(&***db, form.email.trim(), &form.pass).await {
        Ok(principal) => principal,
        Err(Error::InvalidCredentials) => {
            let errors = Violation::CredentialsRejected.into();
            return render_form(&***views, "user/login.html", None, &form, &errors);
        }
        Err(err) => return Err(err),
    };

    session.renew();
    store_principal(&session, &principal)?;
    Ok(views::redirect("/"))
}

#[post("/logout")]
#[tracing::instrument(skip(session))]
pub async fn logout(session: Session) -> HttpResponse {
    session.purge();
    views::redirect("/")
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use actix_web::http::{header, StatusCode};
    use actix_web::test::{call_service, init_service, read_body, TestRequest};

    use super::*;
    use crate::database::test::MockDatabase;
    use crate::test_app;
    use crate::user::{hash_password, UserId};

    fn form(email: &str) -> ProfileForm {
        ProfileForm {
            last_name: "Yamada".to_string(),
            first_name: "Hanako".to_string(),
            email: email.to_string(),
            pass: "secret".to_string(),
        }
    }

    #[test]
    fn profile_form_requires_every_field() {
        let errors = ProfileForm::default().validate().unwrap_err();

        assert!(errors.has("last_name"));
        assert!(errors.has("first_name"));
        assert!(errors.has("email"));
        assert!(errors.has("pass"));
    }

    #[test]
    fn profile_form_rejects_malformed_email() {
        assert!(form("hanako").validate().unwrap_err().has("email"));
        assert!(form("hanako@").validate().unwrap_err().has("email"));
        assert!(form("ha nako@example.com").validate().unwrap_err().has("email"));
        assert!(form("hanako@example.com").validate().is_ok());
    }

    #[test]
    fn profile_form_never_echoes_password() {
        let context = tera::Context::from_serialize(&form("hanako@example.com")).unwrap();

        assert!(context.get("pass").is_none());
        assert!(context.get("email").is_some());
    }

    #[actix_web::test]
    async fn edit_profile_requires_login() {
        let app = init_service(test_app(MockDatabase::new())).await;

        let request = TestRequest::post()
            .uri("/user/edit")
            .set_form(&[
                ("last_name", "Yamada"),
                ("first_name", "Hanako"),
                ("email", "hanako@example.com"),
                ("pass", "secret"),
            ])
            .to_request();
        let response = call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
    }

    #[actix_web::test]
    async fn login_with_wrong_password_rerenders() {
        let mut db = MockDatabase::new();
        let password_hash = hash_password("secret").unwrap();
        db.users.on_fetch_user_by_email = Box::new(move |email| {
            let now = chrono::Utc::now();
            Ok(Some(User {
                id: UserId::new(),
                last_name: "Kawashima".to_string(),
                first_name: "Yoshio".to_string(),
                email,
                password_hash: password_hash.clone(),
                created_at: now,
                modified_at: now,
            }))
        });
        let app = init_service(test_app(db)).await;

        let request = TestRequest::post()
            .uri("/login")
            .set_form(&[("email", "yoshio@example.com"), ("pass", "wrong")])
            .to_request();
        let response = call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_body(response).await;
        let body = std::str::from_utf8(&body).unwrap();
        assert!(body.contains("the email or password is incorrect"));
        assert!(body.contains("yoshio@example.com"));
    }

    #[actix_web::test]
    async fn login_then_edit_profile() {
        let mut db = MockDatabase::new();
        let now = chrono::Utc::now();
        let user = User {
            id: UserId::new(),
            last_name: "Kawashima".to_string(),
            first_name: "Yoshio".to_string(),
            email: "yoshio@example.com".to_string(),
            password_hash: hash_password("secret").unwrap(),
            created_at: now,
            modified_at: now,
        };
        let by_email = user.clone();
        db.users.on_fetch_user_by_email = Box::new(move |_| Ok(Some(by_email.clone())));
        db.users.on_fetch_user_by_id = Box::new(move |_| Ok(Some(user.clone())));
        let app = init_service(test_app(db)).await;

        let request = TestRequest::post()
            .uri("/login")
            .set_form(&[("email", "yoshio@example.com"), ("pass", "secret")])
            .to_request();
        let response = call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let cookie = response
            .response()
            .cookies()
            .next()
            .expect("login did not set a session cookie")
            .into_owned();

        let request = TestRequest::get()
            .uri("/user/edit")
            .cookie(cookie)
            .to_request();
        let response = call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_body(response).await;
        let body = std::str::from_utf8(&body).unwrap();
        assert!(body.contains("yoshio@example.com"));
        assert!(body.contains("Kawashima"));
    }

    #[actix_web::test]
    async fn updating_profile_refreshes_principal_and_ignores_submitted_id() {
        let mut db = MockDatabase::new();
        let now = chrono::Utc::now();
        let user = User {
            id: UserId::new(),
            last_name: "Kawashima".to_string(),
            first_name: "Yoshio".to_string(),
            email: "yoshio@example.com".to_string(),
            password_hash: hash_password("secret").unwrap(),
            created_at: now,
            modified_at: now,
        };
        let user_id = user.id;
        db.users.on_fetch_user_by_email = Box::new(move |email| {
            Ok(Some(user.clone()).filter(|user| user.email == email))
        });
        let updates = Arc::new(Mutex::new(vec![]));
        let updates_clone = Arc::clone(&updates);
        db.users.on_update_user_profile = Box::new(move |(user_id, update)| {
            updates_clone.lock().unwrap().push((user_id, update));
            Ok(true)
        });
        db.campaigns.on_fetch_campaigns = Box::new(|_| Ok(vec![]));
        let app = init_service(test_app(db)).await;

        let request = TestRequest::post()
            .uri("/login")
            .set_form(&[("email", "yoshio@example.com"), ("pass", "secret")])
            .to_request();
        let response = call_service(&app, request).await;
        let cookie = response.response().cookies().next().unwrap().into_owned();

        let other_id = UserId::new().to_string();
        let request = TestRequest::post()
            .uri("/user/edit")
            .cookie(cookie)
            .set_form(&[
                ("user_id", other_id.as_str()),
                ("last_name", "Yamada"),
                ("first_name", "Hanako"),
                ("email", "hanako@example.com"),
                ("pass", "new secret"),
            ])
            .to_request();
        let response = call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
        {
            let updates = updates.lock().unwrap();
            assert_eq!(updates.len(), 1, "db.update_user_profile was not called once");
            assert_eq!(updates[0].0, user_id);
            assert_eq!(updates[0].1.email, "hanako@example.com");
        }
        let cookie = response.response().cookies().next().unwrap().into_owned();

        let request = TestRequest::get().uri("/").cookie(cookie).to_request();
        let response = call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_body(response).await;
        let body = std::str::from_utf8(&body).unwrap();
        assert!(body.contains("Yamada Hanako"));
        assert!(body.contains(UPDATED_MESSAGE));
    }

    #[actix_web::test]
    async fn registering_an_email_taken_by_a_concurrent_write_rerenders() {
        let mut db = MockDatabase::new();
        db.users.on_fetch_user_by_email = Box::new(|_| Ok(None));
        db.users.on_insert_user = Box::new(|user| {
            Err(Error::EmailAlreadyRegistered { email: user.email })
        });
        let app = init_service(test_app(db)).await;

        let request = TestRequest::post()
            .uri("/register")
            .set_form(&[
                ("last_name", "Yamada"),
                ("first_name", "Hanako"),
                ("email", "hanako@example.com"),
                ("pass", "secret"),
            ])
            .to_request();
        let response = call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_body(response).await;
        let body = std::str::from_utf8(&body).unwrap();
        assert!(body.contains("is already registered"));
        assert!(body.contains("hanako@example.com"));
    }
}
