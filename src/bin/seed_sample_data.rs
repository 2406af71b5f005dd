//! Utility to seed sample doctors, patients and appointments

use chrono::{Duration, Utc};
use hms_reports::config::Config;
use hms_reports::db::{self, DbResult};
use hms_reports::models::{
    Address, Appointment, AppointmentCreate, AppointmentStatus, Patient, PatientCreate,
    PatientVitals, Staff, StaffCreate, User, UserCreate, UserRole,
};
use rusqlite::Connection;
use serde_json::json;

const DOCTOR_ID: &str = "doc-2001";
const STAFF_ID: &str = "staff-3001";
const DOCTOR_EMAIL: &str = "anand.kumar@karurgastro.in";

fn seed_doctor(conn: &Connection) -> DbResult<()> {
    if User::get_by_id(conn, DOCTOR_ID)?.is_none() {
        User::create(
            conn,
            &UserCreate {
                id: DOCTOR_ID.into(),
                role: UserRole::Doctor,
                first_name: "Anand".into(),
                last_name: "Kumar".into(),
                email: DOCTOR_EMAIL.into(),
                phone: Some("+91 98430 12345".into()),
                metadata: json!({
                    "specialization": "Gastroenterology",
                    "qualification": "MBBS, MD, DM"
                }),
            },
        )?;
        println!("  Doctor user: {}", DOCTOR_ID);
    }

    if Staff::get_by_id(conn, STAFF_ID)?.is_none() {
        Staff::create(
            conn,
            &StaffCreate {
                id: STAFF_ID.into(),
                name: "Dr. Anand Kumar".into(),
                designation: "Senior Consultant".into(),
                department: "Gastroenterology".into(),
                contact: "+91 98430 12345".into(),
                email: DOCTOR_EMAIL.into(),
                roles: vec!["doctor".into()],
                qualifications: vec!["MBBS".into(), "MD".into(), "DM".into()],
            },
        )?;
        println!("  Staff profile: {}", STAFF_ID);
    }
    Ok(())
}

fn seed_patients(conn: &Connection) -> DbResult<Vec<String>> {
    let patients = [
        ("pat-1001", "Ravi", "Shankar", "M", 54, vec!["Type 2 diabetes"], vec!["Penicillin"]),
        ("pat-1002", "Meena", "Lakshmi", "F", 38, vec!["GERD"], vec![]),
        ("pat-1003", "Karthik", "Raja", "M", 61, vec!["Hypertension", "Fatty liver"], vec!["Sulfa drugs"]),
    ];

    let mut ids = Vec::new();
    for (id, first, last, gender, age, history, allergies) in patients {
        ids.push(id.to_string());
        if Patient::get_by_id(conn, id)?.is_some() {
            continue;
        }
        Patient::create(
            conn,
            &PatientCreate {
                id: id.into(),
                first_name: first.into(),
                last_name: last.into(),
                age: Some(age),
                gender: Some(gender.into()),
                blood_group: Some("O+".into()),
                phone: Some("+91 90000 00000".into()),
                address: Some(Address {
                    street: Some("Kovai Road".into()),
                    city: Some("Karur".into()),
                    state: Some("Tamil Nadu".into()),
                    pincode: Some("639002".into()),
                    ..Default::default()
                }),
                vitals: Some(PatientVitals {
                    height_cm: Some(170.0),
                    weight_kg: Some(72.5),
                    bmi: Some(25.1),
                    bp: Some("128/84".into()),
                    temp: Some(98.6),
                    pulse: Some(76.0),
                    spo2: Some(98.0),
                }),
                medical_history: history.into_iter().map(String::from).collect(),
                allergies: allergies.into_iter().map(String::from).collect(),
                doctor_id: Some(DOCTOR_ID.into()),
                status: Some("Active".into()),
                ..Default::default()
            },
        )?;
        println!("  Patient: {} {} ({})", first, last, id);
    }
    Ok(ids)
}

fn seed_appointments(conn: &Connection, patient_ids: &[String]) -> DbResult<usize> {
    let now = Utc::now();
    let statuses = [
        AppointmentStatus::Completed,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::Scheduled,
    ];

    let mut created = 0;
    for day in -10i64..=3 {
        let patient_id = &patient_ids[day.rem_euclid(patient_ids.len() as i64) as usize];
        let id = format!("apt-{}", day + 100);
        if Appointment::get_by_id(conn, &id)?.is_some() {
            continue;
        }

        let start_at = now + Duration::days(day) + Duration::hours(2);
        let status = if day > 0 {
            AppointmentStatus::Scheduled
        } else {
            statuses[day.rem_euclid(statuses.len() as i64) as usize]
        };

        Appointment::create(
            conn,
            &AppointmentCreate {
                id,
                patient_id: patient_id.clone(),
                doctor_id: DOCTOR_ID.into(),
                appointment_type: Some("Follow-up".into()),
                start_at,
                end_at: Some(start_at + Duration::minutes(30)),
                location: Some("OPD Block A".into()),
                status,
                notes: Some("Routine review of symptoms and medication".into()),
                ..Default::default()
            },
        )?;
        created += 1;
    }
    Ok(created)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    println!("Database path: {}", config.database_path.display());

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = db::Database::new(&config.database_path)?;

    database.with_conn(|conn| {
        db::migrations::run_migrations(conn)?;
        Ok(())
    })?;

    println!("Seeding sample data:");
    database.with_conn(|conn| {
        seed_doctor(conn)?;
        let patients = seed_patients(conn)?;
        let created = seed_appointments(conn, &patients)?;
        println!("  Appointments created: {}", created);
        Ok(())
    })?;

    println!("Try: GET /api/reports/doctor/{} or /api/reports/doctor/{}", DOCTOR_ID, STAFF_ID);
    println!("     GET /api/reports/staff/{}", STAFF_ID);
    Ok(())
}
