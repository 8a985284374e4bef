use crate::infra::{InMemoryApplicationRepository, InMemoryJobPostingRepository, LoggingProvisioner};
use chrono::{Duration, NaiveDate, NaiveTime};
use clap::Args;
use hr_recruitment::config::RecruitmentConfig;
use hr_recruitment::error::AppError;
use hr_recruitment::workflows::recruitment::{
    ApplicationId, ApplicationSubmission, CandidateContact, Clock, Division, DivisionId,
    DivisionRegistry, DivisionView, EducationLevel, EligibilityCriteria, Gender, InterviewMode,
    InterviewRequest, JobId, JobPostingRequest, OffboardingRequest, OffboardingTracker,
    ProfileSnapshot, RecruitmentService, RecruitmentServiceError, StatusAction, SystemClock,
};
use hr_recruitment::workflows::roster::DivisionRosterImporter;
use std::path::PathBuf;
use std::sync::Arc;

type DemoService = RecruitmentService<
    InMemoryApplicationRepository,
    InMemoryJobPostingRepository,
    LoggingProvisioner,
>;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Division roster CSV. Defaults to a single Finance division with one free slot.
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Division receiving the demo hire (must exist in the roster)
    #[arg(long, default_value = "div-finance")]
    pub(crate) division: String,
    /// Local UTC offset used to decide today's date
    #[arg(long, default_value_t = 7)]
    pub(crate) utc_offset_hours: i32,
    /// Interview date (YYYY-MM-DD). Defaults to three days from today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) interview_on: Option<NaiveDate>,
    /// Skip the offboarding portion of the demo.
    #[arg(long)]
    pub(crate) skip_offboarding: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RosterCheckArgs {
    /// Roster CSV with the columns Division,Name,Capacity,Current Staff
    pub(crate) path: PathBuf,
}

pub(crate) fn run_roster_check(args: RosterCheckArgs) -> Result<(), AppError> {
    let importer = DivisionRosterImporter::from_path(&args.path)?;
    println!("Division roster {}", args.path.display());
    render_divisions(&importer.views());
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        roster,
        division,
        utc_offset_hours,
        interview_on,
        skip_offboarding,
    } = args;

    let divisions = Arc::new(DivisionRegistry::new());
    match roster {
        Some(path) => {
            DivisionRosterImporter::from_path(&path)?.seed_registry(&divisions)?;
        }
        None => {
            let finance = Division::new(DivisionId("div-finance".to_string()), "Finance", 3, 2)
                .map_err(RecruitmentServiceError::from)?;
            divisions
                .register(finance)
                .map_err(RecruitmentServiceError::from)?;
        }
    }

    let offset = RecruitmentConfig {
        utc_offset_hours,
        division_roster: None,
    }
    .utc_offset();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(offset));
    let provisioner = Arc::new(LoggingProvisioner::default());
    let service: DemoService = RecruitmentService::new(
        Arc::new(InMemoryApplicationRepository::default()),
        Arc::new(InMemoryJobPostingRepository::default()),
        provisioner.clone(),
        divisions.clone(),
        clock.clone(),
    );
    let division_id = DivisionId(division);
    let interview_on = interview_on.unwrap_or_else(|| clock.today() + Duration::days(3));

    println!("Recruitment lifecycle demo (today is {})", clock.today());
    println!("\nDivisions");
    render_divisions(&divisions.list());

    let posting = service.open_job(JobPostingRequest {
        division_id: division_id.clone(),
        title: "Accounting Staff".to_string(),
        description: "Month-end closing and vendor reconciliation".to_string(),
        requirements: vec!["Bookkeeping".to_string(), "Spreadsheet fluency".to_string()],
        eligibility: EligibilityCriteria {
            min_age: Some(21),
            max_age: Some(40),
            gender: None,
            min_education: Some(EducationLevel::D3),
            min_experience_years: Some(1),
        },
    })?;
    println!(
        "\nOpened {} \"{}\" in {}",
        posting.id, posting.title, posting.division_id
    );

    println!("\nScreening submissions");
    let underage = service.submit(submission(&posting.id, "Rina Marlina", 19))?;
    println!(
        "  {} {}: {} ({})",
        underage.id,
        underage.candidate.name,
        underage.status(),
        underage
            .stage
            .rejection()
            .map(|rejection| rejection.reason.as_str())
            .unwrap_or("no reason")
    );
    let applicant = service.submit(submission(&posting.id, "Ayu Pratiwi", 27))?;
    println!(
        "  {} {}: {}",
        applicant.id,
        applicant.candidate.name,
        applicant.status()
    );

    println!("\nInterview scheduling");
    match service.schedule_interview(&applicant.id, online_interview(interview_on, None)) {
        Ok(_) => println!("  Scheduled without a meeting link"),
        Err(err) => println!("  Refused: {}", err),
    }
    let scheduled = service.schedule_interview(
        &applicant.id,
        online_interview(interview_on, Some("https://meet.example/hr-demo")),
    )?;
    println!("  {} is now {}", scheduled.id, scheduled.status());

    println!("\nOnboarding");
    service.apply_action(&applicant.id, StatusAction::Accept)?;
    service.toggle_checklist_item(&applicant.id, "contract_signed", true)?;
    let partial = service.toggle_checklist_item(&applicant.id, "inventory_handover", true)?;
    render_progress(
        &partial.id,
        partial.status_view().onboarding.map(|view| view.progress_percent),
    );
    match service.convert_to_staff(&applicant.id) {
        Ok(_) => println!("  Converted before the checklist was complete"),
        Err(err) => println!("  Conversion refused: {}", err),
    }
    let complete = service.toggle_checklist_item(&applicant.id, "training_orientation", true)?;
    render_progress(
        &complete.id,
        complete.status_view().onboarding.map(|view| view.progress_percent),
    );

    match service.convert_to_staff(&applicant.id) {
        Ok(conversion) => println!(
            "  Staff account for {} <{}> as {}",
            conversion.account.name, conversion.account.email, conversion.account.position
        ),
        Err(err) => println!("  Conversion refused: {}", err),
    }
    println!("\nDivision after conversion");
    render_divisions(&[service.division(&division_id)?]);

    let status = service.get(&applicant.id)?.status_view();
    match serde_json::to_string_pretty(&status) {
        Ok(json) => println!("\nStatus payload:\n{}", json),
        Err(err) => println!("\nStatus payload unavailable: {}", err),
    }

    if !skip_offboarding {
        demo_offboarding(&divisions, clock.as_ref(), &division_id);
    }

    println!(
        "\nStaff accounts provisioned: {}",
        provisioner.accounts().len()
    );
    Ok(())
}

fn demo_offboarding(
    divisions: &Arc<DivisionRegistry>,
    clock: &dyn Clock,
    division_id: &DivisionId,
) {
    println!("\nOffboarding");
    let tracker = OffboardingTracker::new(divisions.clone());
    let started = match tracker.begin(
        OffboardingRequest {
            division_id: division_id.clone(),
            employee_name: "Hendra Gunawan".to_string(),
            position: Some("Senior Accountant".to_string()),
            reason: Some("Relocation".to_string()),
        },
        clock.now(),
    ) {
        Ok(view) => view,
        Err(err) => {
            println!("  Offboarding refused: {}", err);
            return;
        }
    };
    println!("  {} {}: {}", started.id, started.employee_name, started.status_label);

    for item in ["exit_interview", "asset_return"] {
        match tracker.toggle_item(&started.id, item, true) {
            Ok(view) => println!(
                "  {} done, {}% ({})",
                item, view.progress_percent, view.status_label
            ),
            Err(err) => println!("  {} not recorded: {}", item, err),
        }
    }
    match tracker.mark_complete(&started.id) {
        Ok(view) => println!(
            "  {} ({}), slot released: {}",
            view.status_label, view.progress_percent, view.slot_released
        ),
        Err(err) => println!("  Completion refused: {}", err),
    }
    if let Ok(view) = divisions.get(division_id) {
        render_divisions(&[view]);
    }
}

fn submission(job_id: &JobId, name: &str, age: u8) -> ApplicationSubmission {
    ApplicationSubmission {
        candidate: CandidateContact {
            name: name.to_string(),
            email: format!(
                "{}@example.com",
                name.to_ascii_lowercase().replace(' ', ".")
            ),
        },
        profile: ProfileSnapshot {
            age: Some(age),
            gender: Some(Gender::Female),
            education: Some(EducationLevel::S1),
            experience_years: Some(3),
        },
        job_id: job_id.clone(),
    }
}

fn online_interview(date: NaiveDate, link: Option<&str>) -> InterviewRequest {
    InterviewRequest {
        date,
        start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default(),
        end_time: NaiveTime::from_hms_opt(11, 0, 0),
        mode: InterviewMode::Online,
        interviewer_name: "Rudi Hartono".to_string(),
        link_or_location: link.map(str::to_string),
        notes: Some("Panel with the finance lead".to_string()),
    }
}

fn render_progress(id: &ApplicationId, progress: Option<u8>) {
    match progress {
        Some(percent) => println!("  {} checklist at {}%", id, percent),
        None => println!("  {} has no onboarding checklist", id),
    }
}

fn render_divisions(divisions: &[DivisionView]) {
    if divisions.is_empty() {
        println!("  (no divisions)");
        return;
    }
    for division in divisions {
        println!(
            "  {:<16} {:<24} capacity {:>3}  staff {:>3}  free {:>3}",
            division.id.0,
            division.name,
            division.capacity,
            division.current_staff_count,
            division.available_slots
        );
    }
}
