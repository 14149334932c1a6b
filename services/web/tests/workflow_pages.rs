use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use dissolution::api::{
    ApiError, ApplicationStatus, DissolutionApi, DissolutionGetDirector, DissolutionGetResponse,
};
use dissolution::config::AppConfig;
use dissolution::paths;
use dissolution::session::{
    CookieSigner, DissolutionSession, InMemorySessionStore, Session, SessionError, SessionId,
    SessionStore, SignInInfo,
};
use dissolution_web::{app_router, AppState};
use tower::ServiceExt;

const COMPANY: &str = "01777777";
const APPLICANT: &str = "applicant@mail.com";
const JANE: &str = "jane@mail.com";
const JOHN: &str = "john@mail.com";

#[derive(Default)]
struct StubApi {
    dissolution: Mutex<Option<DissolutionGetResponse>>,
    failing: bool,
    approvals: Mutex<Vec<(String, String, String)>>,
}

impl StubApi {
    fn with(dissolution: DissolutionGetResponse) -> Self {
        Self {
            dissolution: Mutex::new(Some(dissolution)),
            ..Self::default()
        }
    }

    fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl DissolutionApi for StubApi {
    async fn get_dissolution(
        &self,
        _token: &str,
        _company_number: &str,
    ) -> Result<Option<DissolutionGetResponse>, ApiError> {
        if self.failing {
            return Err(ApiError::UnexpectedStatus {
                status: 500,
                body: "boom".to_string(),
            });
        }
        Ok(self
            .dissolution
            .lock()
            .expect("dissolution mutex poisoned")
            .clone())
    }

    async fn approve(
        &self,
        token: &str,
        company_number: &str,
        officer_id: &str,
    ) -> Result<(), ApiError> {
        self.approvals.lock().expect("approvals mutex poisoned").push((
            token.to_string(),
            company_number.to_string(),
            officer_id.to_string(),
        ));
        Ok(())
    }
}

/// Counts writes made by the application; the harness seeds sessions on `inner` directly.
#[derive(Clone, Default)]
struct RecordingSessions {
    inner: InMemorySessionStore,
    saves: Arc<AtomicUsize>,
}

#[async_trait]
impl SessionStore for RecordingSessions {
    async fn load(&self, id: &SessionId) -> Result<Option<Session>, SessionError> {
        self.inner.load(id).await
    }

    async fn save(&self, session: &Session) -> Result<(), SessionError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(session).await
    }

    async fn delete(&self, id: &SessionId) -> Result<(), SessionError> {
        self.inner.delete(id).await
    }
}

fn signing_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 3, 5).expect("valid date")
}

fn config() -> AppConfig {
    let vars = HashMap::from([
        ("CDN_HOST", "//cdn.example.gov.uk"),
        ("CHS_URL", "https://chs.example.gov.uk"),
        ("CHS_COMPANY_PROFILE_API_LOCAL_URL", "http://company-profile.local"),
        ("DISSOLUTIONS_API_URL", "http://dissolutions.local"),
        ("COOKIE_NAME", "__SID"),
        ("COOKIE_SECRET", "super-secret"),
        ("COOKIE_DOMAIN", "example.gov.uk"),
        ("ACCOUNT_URL", "https://account.example.gov.uk"),
        ("OAUTH2_REQUEST_KEY", "request-key"),
        ("OAUTH2_CLIENT_ID", "client-id"),
    ]);
    AppConfig::from_lookup(|name| vars.get(name).map(|value| value.to_string()))
        .expect("test config is complete")
}

fn director(officer_id: &str, name: &str, email: &str, approved: bool) -> DissolutionGetDirector {
    DissolutionGetDirector {
        officer_id: officer_id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        approved_at: approved.then(|| "2021-03-02T09:00:00Z".to_string()),
    }
}

fn application(status: ApplicationStatus) -> DissolutionGetResponse {
    DissolutionGetResponse {
        etag: "e1".to_string(),
        kind: "dissolution-request#dissolution-request".to_string(),
        application_status: status,
        application_reference: "REF123".to_string(),
        application_type: "DS01".to_string(),
        company_number: COMPANY.to_string(),
        company_name: "Example Widgets Ltd".to_string(),
        created_at: "2021-03-01T10:00:00Z".to_string(),
        created_by: APPLICANT.to_string(),
        directors: vec![
            director("abc123", "Jane Smith", JANE, false),
            director("def456", "John Doe", JOHN, true),
        ],
    }
}

struct Harness {
    app: Router,
    api: Arc<StubApi>,
    state: AppState,
    sessions: RecordingSessions,
    cookies: CookieSigner,
}

impl Harness {
    fn new(api: StubApi) -> Self {
        let api = Arc::new(api);
        let sessions = RecordingSessions::default();
        let mut state = AppState::new(config(), api.clone(), Arc::new(sessions.clone()))
            .expect("templates compile");
        state.today = signing_day;

        Self {
            app: app_router(state.clone()),
            cookies: state.cookies.clone(),
            api,
            state,
            sessions,
        }
    }

    /// Store a signed-in session and return its id plus the `Cookie` header value.
    async fn sign_in(
        &self,
        email: &str,
        company: Option<&str>,
        authorised: bool,
    ) -> (SessionId, String) {
        let mut session = Session::new();
        session.sign_in = Some(SignInInfo {
            signed_in: true,
            access_token: "some-token".to_string(),
            user_email: email.to_string(),
            company_number: company.filter(|_| authorised).map(str::to_string),
        });
        session.dissolution = company.map(DissolutionSession::new);
        self.sessions.inner.save(&session).await.expect("session saved");

        let cookie = format!("__SID={}", self.cookies.sign(&session.id));
        (session.id, cookie)
    }

    async fn stored(&self, id: &SessionId) -> Session {
        self.sessions
            .load(id)
            .await
            .expect("store readable")
            .expect("session present")
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.app
            .clone()
            .oneshot(request.body(Body::empty()).expect("request builds"))
            .await
            .expect("router responds")
    }

    async fn post_form(&self, uri: &str, cookie: &str, form: &str) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .expect("request builds");
        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("router responds")
    }
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("redirect carries a location")
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

#[tokio::test]
async fn anonymous_users_are_sent_to_sign_in() {
    let harness = Harness::new(StubApi::default());

    let response = harness.get(paths::REDIRECT_GATE_URI, None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "https://chs.example.gov.uk/signin?return_to=%2Fclose-a-company%2Fredirect"
    );
}

#[tokio::test]
async fn tampered_cookie_is_treated_as_anonymous() {
    let harness = Harness::new(StubApi::default());
    let (id, _) = harness.sign_in(JANE, Some(COMPANY), true).await;

    let forged = format!("__SID={}.deadbeef", id.as_str());
    let response = harness.get(paths::REDIRECT_GATE_URI, Some(&forged)).await;

    assert!(location(&response).starts_with("https://chs.example.gov.uk/signin?"));
}

#[tokio::test]
async fn company_pages_need_a_company_in_the_session() {
    let harness = Harness::new(StubApi::default());
    let (_, cookie) = harness.sign_in(JANE, None, false).await;

    let response = harness.get(paths::REDIRECT_GATE_URI, Some(&cookie)).await;

    assert_eq!(location(&response), paths::SEARCH_COMPANY_URI);
}

#[tokio::test]
async fn unauthorised_company_starts_oauth_authorisation() {
    let harness = Harness::new(StubApi::default());
    let (_, cookie) = harness.sign_in(JANE, Some(COMPANY), false).await;

    let response = harness.get(paths::REDIRECT_GATE_URI, Some(&cookie)).await;

    let target = location(&response);
    assert!(target.starts_with("https://account.example.gov.uk/oauth2/authorise?client_id=client-id"));
    assert!(target.contains("scope=https%3A%2F%2Fapi.companieshouse.gov.uk%2Fcompany%2F01777777"));
}

#[tokio::test]
async fn gate_without_application_goes_to_select_director() {
    let harness = Harness::new(StubApi::default());
    let (_, cookie) = harness.sign_in(APPLICANT, Some(COMPANY), true).await;

    let response = harness.get(paths::REDIRECT_GATE_URI, Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), paths::SELECT_DIRECTOR_URI);
}

#[tokio::test]
async fn gate_routes_each_party_by_status() {
    let cases = [
        (ApplicationStatus::PendingApproval, JANE, paths::ENDORSE_COMPANY_CLOSURE_CERTIFICATE_URI),
        (ApplicationStatus::PendingApproval, JOHN, paths::WAIT_FOR_OTHERS_TO_SIGN_URI),
        (ApplicationStatus::PendingApproval, APPLICANT, paths::WAIT_FOR_OTHERS_TO_SIGN_URI),
        (ApplicationStatus::PendingApproval, "stranger@mail.com", paths::NOT_SELECTED_SIGNATORY_URI),
        (ApplicationStatus::PendingPayment, APPLICANT, paths::PAYMENT_URI),
        (ApplicationStatus::PendingPayment, JOHN, paths::WAIT_FOR_OTHERS_TO_SIGN_URI),
        (ApplicationStatus::Paid, JANE, paths::VIEW_FINAL_CONFIRMATION_URI),
        (ApplicationStatus::Paid, "stranger@mail.com", paths::NOT_SELECTED_SIGNATORY_URI),
    ];

    for (status, email, expected) in cases {
        let harness = Harness::new(StubApi::with(application(status)));
        let (_, cookie) = harness.sign_in(email, Some(COMPANY), true).await;

        let response = harness.get(paths::REDIRECT_GATE_URI, Some(&cookie)).await;

        assert_eq!(location(&response), expected, "{status:?} / {email}");
    }
}

#[tokio::test]
async fn gate_stores_approval_for_pending_signatory() {
    let harness = Harness::new(StubApi::with(application(ApplicationStatus::PendingApproval)));
    let (id, cookie) = harness.sign_in(JANE, Some(COMPANY), true).await;

    harness.get(paths::REDIRECT_GATE_URI, Some(&cookie)).await;

    let approval = harness
        .stored(&id)
        .await
        .dissolution
        .and_then(|dissolution| dissolution.approval)
        .expect("approval stored");
    assert_eq!(approval.company_name, "Example Widgets Ltd");
    assert_eq!(approval.applicant, "Jane Smith");
    assert_eq!(approval.officer_id, "abc123");
    assert_eq!(approval.date, "05 March 2021");
}

#[tokio::test]
async fn gate_without_application_leaves_session_untouched() {
    let harness = Harness::new(StubApi::default());
    let (id, cookie) = harness.sign_in(APPLICANT, Some(COMPANY), true).await;
    let before = harness.stored(&id).await;

    let response = harness.get(paths::REDIRECT_GATE_URI, Some(&cookie)).await;

    assert_eq!(location(&response), paths::SELECT_DIRECTOR_URI);
    assert_eq!(harness.sessions.saves.load(Ordering::SeqCst), 0);
    assert_eq!(harness.stored(&id).await, before);
}

#[tokio::test]
async fn gate_drops_approval_once_signed_elsewhere() {
    let harness = Harness::new(StubApi::with(application(ApplicationStatus::PendingApproval)));
    let (id, cookie) = harness.sign_in(JANE, Some(COMPANY), true).await;
    harness.get(paths::REDIRECT_GATE_URI, Some(&cookie)).await;

    {
        let mut upstream = harness.api.dissolution.lock().expect("dissolution mutex");
        let record = upstream.as_mut().expect("application present");
        record.directors[0].approved_at = Some("2021-03-05T12:00:00Z".to_string());
    }

    let response = harness.get(paths::REDIRECT_GATE_URI, Some(&cookie)).await;
    assert_eq!(location(&response), paths::WAIT_FOR_OTHERS_TO_SIGN_URI);
    assert!(harness
        .stored(&id)
        .await
        .dissolution
        .is_some_and(|dissolution| dissolution.approval.is_none()));

    let response = harness
        .get(paths::ENDORSE_COMPANY_CLOSURE_CERTIFICATE_URI, Some(&cookie))
        .await;
    assert_eq!(location(&response), paths::REDIRECT_GATE_URI);

    let response = harness
        .post_form(
            paths::ENDORSE_COMPANY_CLOSURE_CERTIFICATE_URI,
            &cookie,
            "confirmation=understood",
        )
        .await;
    assert_eq!(location(&response), paths::REDIRECT_GATE_URI);
    assert!(harness.api.approvals.lock().expect("approvals").is_empty());
}

#[tokio::test]
async fn endorse_page_redirects_to_gate_until_approval_prepared() {
    let harness = Harness::new(StubApi::with(application(ApplicationStatus::PendingApproval)));
    let (_, cookie) = harness.sign_in(JANE, Some(COMPANY), true).await;

    let response = harness
        .get(paths::ENDORSE_COMPANY_CLOSURE_CERTIFICATE_URI, Some(&cookie))
        .await;
    assert_eq!(location(&response), paths::REDIRECT_GATE_URI);

    harness.get(paths::REDIRECT_GATE_URI, Some(&cookie)).await;
    let response = harness
        .get(paths::ENDORSE_COMPANY_CLOSURE_CERTIFICATE_URI, Some(&cookie))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(r#"id="applicant">Jane Smith</dd>"#));
    assert!(body.contains(r#"id="date">05 March 2021</dd>"#));
    assert!(!body.contains("confirmation-error"));
}

#[tokio::test]
async fn endorse_requires_confirmation_before_approving() {
    let harness = Harness::new(StubApi::with(application(ApplicationStatus::PendingApproval)));
    let (id, cookie) = harness.sign_in(JANE, Some(COMPANY), true).await;
    harness.get(paths::REDIRECT_GATE_URI, Some(&cookie)).await;

    let response = harness
        .post_form(paths::ENDORSE_COMPANY_CLOSURE_CERTIFICATE_URI, &cookie, "")
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(r#"id="confirmation-error""#));
    assert!(body.contains("Confirm that you have read the statement and approve the application"));
    assert!(harness.api.approvals.lock().expect("approvals").is_empty());

    let response = harness
        .post_form(
            paths::ENDORSE_COMPANY_CLOSURE_CERTIFICATE_URI,
            &cookie,
            "confirmation=understood",
        )
        .await;

    assert_eq!(location(&response), paths::REDIRECT_GATE_URI);
    assert_eq!(
        harness.api.approvals.lock().expect("approvals").as_slice(),
        &[(
            "some-token".to_string(),
            COMPANY.to_string(),
            "abc123".to_string()
        )]
    );
    let stored = harness.stored(&id).await;
    assert!(stored
        .dissolution
        .is_some_and(|dissolution| dissolution.approval.is_none()));
}

#[tokio::test]
async fn not_selected_page_lists_signatories_without_change_links() {
    let harness = Harness::new(StubApi::with(application(ApplicationStatus::PendingApproval)));
    let (_, cookie) = harness.sign_in("stranger@mail.com", Some(COMPANY), true).await;

    let response = harness
        .get(paths::NOT_SELECTED_SIGNATORY_URI, Some(&cookie))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("<h1 class=\"govuk-heading-xl\">Email address not authorised to sign</h1>"));
    assert!(body.contains("stranger@mail.com"));
    assert!(body.contains(r#"id="name-0">Jane Smith</td>"#));
    assert!(body.contains(r#"id="email-1">john@mail.com</td>"#));
    assert!(!body.contains(r#"id="name-2""#));
    assert!(body.contains("Not signed"));
    assert!(body.contains(r#"<strong class="govuk-tag">Signed</strong>"#));
    assert!(!body.contains(r#"id="change-col""#));
}

#[tokio::test]
async fn applicant_can_change_unsigned_directors_while_waiting() {
    let harness = Harness::new(StubApi::with(application(ApplicationStatus::PendingApproval)));
    let (_, cookie) = harness.sign_in(APPLICANT, Some(COMPANY), true).await;

    let response = harness
        .get(paths::WAIT_FOR_OTHERS_TO_SIGN_URI, Some(&cookie))
        .await;

    let body = body_text(response).await;
    assert!(body.contains("Waiting for other directors to sign"));
    assert!(body.contains("REF123"));
    assert!(body.contains(r#"id="change-col""#));
    assert!(body.contains(r#"id="change-0""#));
    assert!(!body.contains(r#"id="change-1""#));
}

#[tokio::test]
async fn signatory_sees_status_without_change_column() {
    let harness = Harness::new(StubApi::with(application(ApplicationStatus::PendingApproval)));
    let (_, cookie) = harness.sign_in(JOHN, Some(COMPANY), true).await;

    let response = harness
        .get(paths::WAIT_FOR_OTHERS_TO_SIGN_URI, Some(&cookie))
        .await;

    let body = body_text(response).await;
    assert!(!body.contains(r#"id="change-col""#));
}

#[tokio::test]
async fn search_company_sanitises_and_starts_session() {
    let harness = Harness::new(StubApi::default());
    let (id, cookie) = harness.sign_in(JANE, None, false).await;

    let response = harness
        .post_form(paths::SEARCH_COMPANY_URI, &cookie, "companyNumber=+sc+1234+")
        .await;

    assert_eq!(location(&response), paths::REDIRECT_GATE_URI);
    let stored = harness.stored(&id).await;
    assert_eq!(stored.company_number(), Some("SC001234"));
}

#[tokio::test]
async fn search_company_requires_a_number() {
    let harness = Harness::new(StubApi::default());
    let (_, cookie) = harness.sign_in(JANE, None, false).await;

    let response = harness
        .post_form(paths::SEARCH_COMPANY_URI, &cookie, "companyNumber=")
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(r#"id="companyNumber-error""#));
    assert!(body.contains("Company number is required"));
}

#[tokio::test]
async fn api_failure_renders_error_page_with_bad_gateway() {
    let harness = Harness::new(StubApi::failing());
    let (_, cookie) = harness.sign_in(JANE, Some(COMPANY), true).await;

    let response = harness.get(paths::REDIRECT_GATE_URI, Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(response
        .headers()
        .contains_key(header::CONTENT_SECURITY_POLICY));
    let body = body_text(response).await;
    assert!(body.contains("Sorry, there is a problem with the service"));
}

#[tokio::test]
async fn pages_share_nonce_between_policy_and_markup() {
    let harness = Harness::new(StubApi::default());
    let (_, cookie) = harness.sign_in(JANE, None, false).await;

    let response = harness.get(paths::SEARCH_COMPANY_URI, Some(&cookie)).await;

    let headers = response.headers().clone();
    assert_eq!(
        headers.get(header::CACHE_CONTROL).and_then(|v| v.to_str().ok()),
        Some("no-store, no-cache, must-revalidate, proxy-revalidate")
    );
    assert_eq!(
        headers.get(header::X_FRAME_OPTIONS).and_then(|v| v.to_str().ok()),
        Some("SAMEORIGIN")
    );
    let policy = headers
        .get(header::CONTENT_SECURITY_POLICY)
        .and_then(|v| v.to_str().ok())
        .expect("csp header present");
    let nonce = policy
        .split_once("'nonce-")
        .and_then(|(_, rest)| rest.split_once('\''))
        .map(|(nonce, _)| nonce.to_string())
        .expect("policy carries a nonce");

    let body = body_text(response).await;
    assert!(body.contains(&format!(r#"nonce="{nonce}""#)));
}

#[tokio::test]
async fn probes_report_health_and_readiness() {
    let harness = Harness::new(StubApi::default());

    let health = harness.get(paths::HEALTHCHECK_URI, None).await;
    assert_eq!(health.status(), StatusCode::OK);
    assert!(health
        .headers()
        .contains_key(header::STRICT_TRANSPORT_SECURITY));
    assert_eq!(body_text(health).await, r#"{"status":"ok"}"#);

    let ready = harness.get(paths::READINESS_URI, None).await;
    assert_eq!(ready.status(), StatusCode::SERVICE_UNAVAILABLE);

    harness.state.readiness.store(true, Ordering::Relaxed);
    let ready = harness.get(paths::READINESS_URI, None).await;
    assert_eq!(ready.status(), StatusCode::OK);

    let metrics = harness.get(paths::METRICS_URI, None).await;
    assert_eq!(metrics.status(), StatusCode::SERVICE_UNAVAILABLE);
}
